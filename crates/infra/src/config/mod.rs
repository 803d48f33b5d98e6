//! Configuration loading and management
//!
//! This module provides utilities for loading dispatcher configuration
//! from environment variables and files.

pub mod loader;

use std::path::PathBuf;

use cloudapi_domain::CallOptions;
use serde::{Deserialize, Serialize};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

/// Settings a [`crate::Dispatcher`] is constructed with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Options applied to every call unless overridden per call
    pub defaults: CallOptions,
    /// PEM bundle of additional trusted CAs
    pub ca_bundle: Option<PathBuf>,
    /// Request timeout when a call sets none
    pub timeout_secs: Option<u64>,
    /// User agent sent with every request
    pub user_agent: Option<String>,
}
