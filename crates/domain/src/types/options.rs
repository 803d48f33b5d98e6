//! Per-call options
//!
//! Every field of [`CallOptions`] is optional so that call-specific values can
//! be layered over the defaults a dispatcher was constructed with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recognized call options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    /// Emit the parsed result to standard output
    pub display: Option<bool>,
    /// Follow up to `redirect + 1` redirects; unset means never follow
    /// Redirect count; `None` never follows
    pub redirect: Option<u32>,
    /// `Some(false)` never follows redirects, whatever `redirect` says
    pub follow_redirects: Option<bool>,
    /// Disable TLS peer verification
    pub no_verify_peer: Option<bool>,
    /// Keep the raw response headers alongside the parsed body
    pub include_header: Option<bool>,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl CallOptions {
    /// No options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the parsed result to standard output.
    pub fn display(mut self, enabled: bool) -> Self {
        self.display = Some(enabled);
        self
    }

    /// Follow up to `max + 1` redirects.
    pub fn redirect(mut self, max: u32) -> Self {
        self.redirect = Some(max);
        self
    }

    /// `false` never follows redirects.
    pub fn follow_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = Some(enabled);
        self
    }

    /// Skip certificate chain validation on https endpoints.
    pub fn no_verify_peer(mut self, enabled: bool) -> Self {
        self.no_verify_peer = Some(enabled);
        self
    }

    /// Keep the raw status line and headers.
    pub fn include_header(mut self, enabled: bool) -> Self {
        self.include_header = Some(enabled);
        self
    }

    /// Whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Layer `self` over `defaults`; values set on `self` win.
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            display: self.display.or(defaults.display),
            redirect: self.redirect.or(defaults.redirect),
            follow_redirects: self.follow_redirects.or(defaults.follow_redirects),
            no_verify_peer: self.no_verify_peer.or(defaults.no_verify_peer),
            include_header: self.include_header.or(defaults.include_header),
            timeout_ms: self.timeout_ms.or(defaults.timeout_ms),
        }
    }

    /// Merge over `defaults` and fill the remaining gaps.
    pub fn resolve(&self, defaults: &Self) -> ResolvedOptions {
        let merged = self.merged_over(defaults);
        ResolvedOptions {
            display: merged.display.unwrap_or(false),
            redirect: merged.redirect.filter(|_| merged.follow_redirects != Some(false)),
            no_verify_peer: merged.no_verify_peer.unwrap_or(false),
            include_header: merged.include_header.unwrap_or(false),
            timeout: merged.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Effective options for a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Print the result to standard output
    pub display: bool,
    pub redirect: Option<u32>,
    /// Skip certificate chain validation
    pub no_verify_peer: bool,
    /// Keep raw headers in the envelope
    pub include_header: bool,
    /// Whole-request timeout, if any
    pub timeout: Option<Duration>,
}

impl ResolvedOptions {
    /// Number of redirect hops the transport may follow.
    pub fn redirect_limit(&self) -> Option<usize> {
        self.redirect.map(|max| usize::try_from(max).unwrap_or(usize::MAX).saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_values_win_over_defaults() {
        let defaults =
            CallOptions::new().display(true).redirect(2).timeout(Duration::from_secs(5));
        let call = CallOptions::new().display(false).include_header(true);

        let merged = call.merged_over(&defaults);
        assert_eq!(merged.display, Some(false));
        assert_eq!(merged.redirect, Some(2));
        assert_eq!(merged.include_header, Some(true));
        assert_eq!(merged.timeout_ms, Some(5_000));
        assert_eq!(merged.no_verify_peer, None);
    }

    #[test]
    fn resolve_fills_gaps() {
        let resolved = CallOptions::new().resolve(&CallOptions::new());
        assert_eq!(resolved, ResolvedOptions::default());
        assert_eq!(resolved.redirect_limit(), None);
    }

    #[test]
    fn redirect_limit_allows_one_extra_hop() {
        let resolved = CallOptions::new().redirect(0).resolve(&CallOptions::new());
        assert_eq!(resolved.redirect_limit(), Some(1));

        let resolved = CallOptions::new().redirect(3).resolve(&CallOptions::new());
        assert_eq!(resolved.redirect_limit(), Some(4));
    }

    #[test]
    fn follow_redirects_false_disables_default_redirect() {
        let defaults = CallOptions::new().redirect(5);
        let resolved = CallOptions::new().follow_redirects(false).resolve(&defaults);
        assert_eq!(resolved.redirect, None);
        assert_eq!(resolved.redirect_limit(), None);
    }

    #[test]
    fn timeout_round_trips_through_millis() {
        let resolved =
            CallOptions::new().timeout(Duration::from_secs(2)).resolve(&CallOptions::new());
        assert_eq!(resolved.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn deserializes_partial_options() {
        let options: CallOptions = serde_json::from_str(r#"{"redirect": 1}"#).unwrap();
        assert_eq!(options, CallOptions::new().redirect(1));
    }
}
