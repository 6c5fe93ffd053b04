pub mod access;
pub mod credentials;
pub mod documents;
pub mod error;
pub mod events;
pub mod identity;
pub mod model;
pub mod ports;
pub mod repo;
