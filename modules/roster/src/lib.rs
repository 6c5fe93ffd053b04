// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{error, model, DocumentStore, IdentityProvider, RosterError};

// === MODULE DEFINITION ===
pub mod module;
pub use module::{register, Roster, MODULE_NAME};

// === CLIENT APPLICATION ===
pub mod client;

// === INTERNAL MODULES ===
// Exposed for integration tests; other crates should use `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
