//! # ModKit
//!
//! Small module system used by the server: modules implement capability traits
//! (`Module`, `DbModule`, `RestfulModule`, `RestHostModule`, `StatefulModule`),
//! register themselves into a [`RegistryBuilder`] and are driven through the
//! phases init → db → rest → start → stop by [`runtime::run`].
//!
//! ```rust,ignore
//! pub fn register(b: &mut modkit::RegistryBuilder) {
//!     let m = Arc::new(MyModule::default());
//!     b.register_core_with_meta("my_module", &["api_ingress"], m.clone());
//!     b.register_rest_with_meta("my_module", m);
//! }
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod contracts;
pub use crate::contracts::*;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod client_hub;
pub use client_hub::ClientHub;

pub mod registry;
pub use registry::{ModuleRegistry, Registrator, RegistryBuilder, RegistryError};

pub mod api;
pub use api::problem::{not_found, Problem, ProblemResponse, ValidationError};

pub mod http;
pub use http::sse::{sse_stream_response, SseBroadcaster};

pub mod runtime;
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
