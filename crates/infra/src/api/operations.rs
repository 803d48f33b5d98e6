//! Thin operations built on the dispatcher
//!
//! Each operation only supplies a resource path, a verb and a response
//! unwrapping convention. Paths embed the canonical site name.

use cloudapi_domain::{CallOptions, CloudApiError, Result};
use serde_json::Value;
use tracing::{info, instrument};

use super::dispatcher::Dispatcher;
use super::location::location_of;
use super::request::DispatchRequest;

impl Dispatcher {
    /// Databases of one environment
    ///
    /// # Errors
    ///
    /// Propagates any dispatch failure
    pub async fn list_databases(&self, site: &str, env: &str) -> Result<Value> {
        let canonical = self.resolve_site_name(site)?;
        let path = format!("/sites/{}/envs/{}/dbs", canonical, env);
        Ok(self.dispatch(DispatchRequest::get(site, path)).await?.into_result())
    }

    /// Signed, short-lived download URL of a database backup
    ///
    /// The API answers with a redirect; the URL is taken from its `Location`
    /// header rather than followed.
    ///
    /// # Errors
    ///
    /// Returns `CloudApiError::ResourceNotFound` when the backup is missing or
    /// the response carries no `Location` header
    #[instrument(skip(self))]
    pub async fn backup_download_url(
        &self,
        site: &str,
        env: &str,
        db: &str,
        backup_id: &str,
    ) -> Result<String> {
        let canonical = self.resolve_site_name(site)?;
        let path =
            format!("/sites/{}/envs/{}/dbs/{}/backups/{}/download", canonical, env, db, backup_id);
        // never follow: the redirect target is the answer
        let options = CallOptions::new().include_header(true).follow_redirects(false);

        let envelope = self.dispatch(DispatchRequest::get(site, path).options(options)).await?;
        let url = location_of(&envelope)?;
        info!("resolved backup download location");
        Ok(url)
    }

    /// Installing a distribution into an environment is disabled for this
    /// client: it always fails with `NotImplemented` and performs no network
    /// I/O.
    ///
    /// # Errors
    ///
    /// Always returns `CloudApiError::NotImplemented`
    pub fn install_distribution(
        &self,
        _site: &str,
        _env: &str,
        _kind: &str,
        _source: &str,
    ) -> Result<Value> {
        Err(CloudApiError::NotImplemented { operation: "install_distribution" })
    }
}
