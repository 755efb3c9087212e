//! Shared HTTP, config and observability plumbing for Croscout services.

pub mod config;
pub mod health;
pub mod middleware;
pub mod response;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
