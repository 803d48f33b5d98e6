//! Per-site credential store
//!
//! The store maps a site identifier to either a credential record or, for
//! aliased sites, the identifier of another site. Aliases are followed one
//! hop only. The store is populated once and read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CloudApiError, Result};

/// Credentials and endpoint for one site
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCredentials {
    /// Basic auth user
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// Endpoint base URL, e.g. `https://cloudapi.example.com/v1`
    pub endpoint: String,
    /// Stage label of the hosting realm (e.g. `prod`, `devcloud`)
    #[serde(default)]
    pub stage: String,
}

impl SiteCredentials {
    /// Credentials for one site.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        endpoint: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            endpoint: endpoint.into(),
            stage: stage.into(),
        }
    }

    /// `username:password` as used for HTTP Basic authentication.
    pub fn user_password(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }
}

// Passwords must never end up in logs.
impl fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("stage", &self.stage)
            .finish()
    }
}

/// Stored value for a site identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialEntry {
    /// Identifier of the site this one aliases
    Alias(String),
    /// Credentials of a canonical site
    Record(SiteCredentials),
}

/// Immutable mapping from site identifier to credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    entries: BTreeMap<String, CredentialEntry>,
}

impl CredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential record for `site`.
    pub fn with_site(mut self, site: impl Into<String>, credentials: SiteCredentials) -> Self {
        self.entries.insert(site.into(), CredentialEntry::Record(credentials));
        self
    }

    /// Make `site` an alias of `target`.
    pub fn with_alias(mut self, site: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.insert(site.into(), CredentialEntry::Alias(target.into()));
        self
    }

    /// Number of site identifiers, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no site is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical identifier for `site`.
    ///
    /// # Errors
    /// Returns `CloudApiError::UnknownSite` if `site` is empty or not in the
    /// store.
    pub fn resolve_site_name<'a>(&'a self, site: &'a str) -> Result<&'a str> {
        if site.is_empty() {
            return Err(CloudApiError::unknown_site(site));
        }

        match self.entries.get(site) {
            Some(CredentialEntry::Alias(target)) => Ok(target.as_str()),
            Some(CredentialEntry::Record(_)) => Ok(site),
            None => Err(CloudApiError::unknown_site(site)),
        }
    }

    /// Credential record for `site`, following at most one alias.
    ///
    /// # Errors
    /// Returns `CloudApiError::UnknownSite` if the site does not resolve to a
    /// record.
    pub fn credentials_for(&self, site: &str) -> Result<&SiteCredentials> {
        let canonical = self.resolve_site_name(site)?;
        match self.entries.get(canonical) {
            Some(CredentialEntry::Record(credentials)) => Ok(credentials),
            // dangling alias, or alias of an alias
            _ => Err(CloudApiError::unknown_site(site)),
        }
    }

    /// `username:password` for `site`.
    ///
    /// # Errors
    /// Returns `CloudApiError::UnknownSite` if the site does not resolve to a
    /// record.
    pub fn resolve_credentials(&self, site: &str) -> Result<String> {
        self.credentials_for(site).map(SiteCredentials::user_password)
    }
}
