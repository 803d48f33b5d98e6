//! # CloudAPI Domain
//!
//! Domain types for the hosting control API client.
//!
//! This crate contains:
//! - The per-site credential store and alias resolution
//! - Call options and their merge rules
//! - The response envelope returned by every dispatched call
//! - The error taxonomy and Result definition
//!
//! ## Architecture
//! - No dependencies on other CloudAPI crates
//! - No I/O: transport and configuration loading live in `cloudapi-infra`

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
