pub mod client;
pub mod error;
pub mod model;

pub use client::{DocumentStore, IdentityProvider};
pub use error::RosterError;
pub use model::{AdminData, AuthUser, NewStudent, Profile, Role, Session, SessionToken, Student};
