//! `Location` header extraction
//!
//! Backup downloads answer with a redirect whose `Location` header carries a
//! transient signed URL instead of a JSON body field.

use cloudapi_domain::{CloudApiError, ResponseEnvelope, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static LOCATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^location:[ \t]*(.*?)[ \t]*\r?$").expect("LOCATION_REGEX should compile")
});

/// Extract the `Location` header value from raw response header text.
///
/// # Errors
/// Returns `CloudApiError::ResourceNotFound` if no `Location` header is
/// present.
pub fn extract_location(raw: &str) -> Result<String> {
    LOCATION_REGEX
        .captures(header_block(raw))
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CloudApiError::ResourceNotFound {
            status: None,
            message: "no Location header in response".to_string(),
        })
}

/// Text before the blank line that ends the headers.
fn header_block(raw: &str) -> &str {
    let end = [raw.find("\r\n\r\n"), raw.find("\n\n")].into_iter().flatten().min();
    &raw[..end.unwrap_or(raw.len())]
}

/// Extract the `Location` header from an envelope fetched with
/// `include_header`.
///
/// # Errors
/// Returns `CloudApiError::ResourceNotFound` if the envelope carries no raw
/// content or no `Location` header.
pub fn location_of(envelope: &ResponseEnvelope) -> Result<String> {
    let raw = envelope.content.as_deref().ok_or_else(|| CloudApiError::ResourceNotFound {
        status: None,
        message: "response headers were not retained".to_string(),
    })?;
    extract_location(raw)
}
