//! # CloudAPI Infrastructure
//!
//! Everything that touches the network, the filesystem or the process
//! environment.
//!
//! This crate contains:
//! - The HTTP transport (reqwest) with TLS and redirect policy
//! - The request dispatcher every control API call goes through
//! - Query encoding and `Location` header extraction
//! - A handful of thin operations built on the dispatcher
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Depends on `cloudapi-domain` for types and errors
//! - Callers construct and own a [`Dispatcher`]; there is no global registry

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::*;
pub use config::DispatcherConfig;
pub use http::*;
