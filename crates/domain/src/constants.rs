//! Wire-level constants
//!
//! Centralized location for the values the control API expects on every
//! request.

// Request shape
/// Appended to every resource path
pub const RESOURCE_SUFFIX: &str = ".json";
/// Content type of non-empty request bodies
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

// Status handling
/// HTTP 200
pub const STATUS_OK: u16 = 200;
/// HTTP 307, treated as success
pub const STATUS_TEMPORARY_REDIRECT: u16 = 307; // backup downloads answer with this
/// HTTP 404, mapped to `ResourceNotFound`
pub const STATUS_NOT_FOUND: u16 = 404;

// Transport defaults
/// Whole-request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// User agent sent unless overridden
pub const DEFAULT_USER_AGENT: &str = concat!("cloudapi/", env!("CARGO_PKG_VERSION"));

/// Returns `true` for the statuses the control API uses to signal success.
pub const fn is_success_status(status: u16) -> bool {
    (status >= 200 && status < 300) || status == STATUS_TEMPORARY_REDIRECT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses() {
        assert!(is_success_status(STATUS_OK));
        assert!(is_success_status(STATUS_TEMPORARY_REDIRECT));
        assert!(is_success_status(204));
        assert!(!is_success_status(STATUS_NOT_FOUND));
        assert!(!is_success_status(302));
        assert!(!is_success_status(500));
    }
}
