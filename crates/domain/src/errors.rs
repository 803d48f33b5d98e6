//! Error types used throughout the client

use serde_json::Value;
use thiserror::Error;

use crate::types::CallContext;

/// Boxed underlying cause of a transport failure.
pub type TransportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for CloudAPI calls
#[derive(Error, Debug)]
pub enum CloudApiError {
    /// The site identifier is empty, absent from the credential store, or an
    /// alias that does not lead to a credential record. Raised before any
    /// network I/O.
    #[error("Unknown site: {site:?}")]
    UnknownSite { site: String },

    /// Connection, TLS, DNS, timeout or body streaming failure.
    #[error("Transport error during {call}: {source}")]
    Transport {
        call: Box<CallContext>,
        #[source]
        source: TransportCause,
    },

    /// HTTP 404, or an expected header could not be found in the response.
    #[error("Resource not found: {message}")]
    ResourceNotFound { status: Option<u16>, message: String },

    /// Any other non-success HTTP status.
    #[error("API error {status} during {call}")]
    Api { status: u16, body: Option<Value>, call: Box<CallContext> },

    /// The operation is intentionally disabled and never reaches the network.
    #[error("Operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    /// The caller cancelled the in-flight request.
    #[error("Request cancelled during {call}")]
    Cancelled { call: Box<CallContext> },

    /// Invalid configuration or dispatcher setup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudApiError {
    /// `UnknownSite` for `site`.
    pub fn unknown_site(site: impl Into<String>) -> Self {
        Self::UnknownSite { site: site.into() }
    }

    /// `Transport` failure of `call` caused by `source`.
    pub fn transport(call: &CallContext, source: impl Into<TransportCause>) -> Self {
        Self::Transport { call: Box::new(call.clone()), source: source.into() }
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ResourceNotFound { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for `ResourceNotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// Original call arguments, when the failure happened on the wire.
    pub fn call(&self) -> Option<&CallContext> {
        match self {
            Self::Transport { call, .. } | Self::Api { call, .. } | Self::Cancelled { call } => {
                Some(&**call)
            }
            _ => None,
        }
    }
}

/// Result type alias for CloudAPI operations
pub type Result<T> = std::result::Result<T, CloudApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> CallContext {
        CallContext::new("demo", "GET", "/sites/demo.json", Vec::new())
    }

    #[test]
    fn status_is_exposed_for_http_failures() {
        let api = CloudApiError::Api { status: 500, body: None, call: Box::new(call()) };
        assert_eq!(api.status(), Some(500));

        let missing = CloudApiError::ResourceNotFound { status: Some(404), message: "gone".into() };
        assert_eq!(missing.status(), Some(404));
        assert!(missing.is_not_found());

        assert_eq!(CloudApiError::unknown_site("nope").status(), None);
    }

    #[test]
    fn transport_keeps_cause_and_call() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = CloudApiError::transport(&call(), io);

        assert_eq!(err.call().map(|c| c.site.as_str()), Some("demo"));
        let rendered = err.to_string();
        assert!(rendered.contains("GET /sites/demo.json"));
        assert!(rendered.contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_implemented_names_operation() {
        let err = CloudApiError::NotImplemented { operation: "install_distribution" };
        assert_eq!(err.to_string(), "Operation not implemented: install_distribution");
        assert!(err.call().is_none());
    }
}
