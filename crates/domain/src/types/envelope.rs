//! Response envelope returned by every dispatched call

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful response of a dispatched call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// HTTP status of the final response
    pub status: u16,
    /// Parsed JSON body; `Null` when streamed, empty, or not JSON
    pub result: Value,
    /// Raw status line and headers (plus the body when buffered), only kept
    /// when `include_header` was requested
    pub content: Option<String>,
}

impl ResponseEnvelope {
    /// Envelope without raw content.
    pub fn new(status: u16, result: Value) -> Self {
        Self { status, result, content: None }
    }

    /// Attach the raw headers (and body).
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    /// Consume the envelope, keeping the parsed result.
    pub fn into_result(self) -> Value {
        self.result
    }
}
