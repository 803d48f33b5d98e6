//! Call arguments carried on failures for diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// The original arguments of a dispatched call.
///
/// Never holds credentials or request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Site identifier as passed by the caller
    pub site: String,
    /// HTTP verb
    pub method: String,
    /// Resource path without the `.json` suffix
    pub resource_path: String,
    /// Query pairs before encoding
    pub query: Vec<(String, String)>,
}

impl CallContext {
    /// Capture the arguments of one call.
    pub fn new(
        site: impl Into<String>,
        method: impl Into<String>,
        resource_path: impl Into<String>,
        query: Vec<(String, String)>,
    ) -> Self {
        Self {
            site: site.into(),
            method: method.into(),
            resource_path: resource_path.into(),
            query,
        }
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.resource_path, self.site)
    }
}
