pub mod auth;
pub mod body;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
