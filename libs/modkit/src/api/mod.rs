//! Shared HTTP API types.

pub mod problem;
