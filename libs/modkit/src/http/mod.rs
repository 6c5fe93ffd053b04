//! HTTP helpers shared by REST modules.

pub mod sse;
