use std::time::Duration;

use cloudapi_domain::constants::DEFAULT_USER_AGENT;
use cloudapi_domain::{CloudApiError, Result};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use super::tls::hostname_only_config;

/// HTTP client that executes every request exactly once.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder. No retries are attempted.
    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let request = builder.build()?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %redacted(&url), "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, url = %redacted(&url), %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, url = %redacted(&url), error = %err, "HTTP request failed");
                Err(err)
            }
        }
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    redirect_limit: Option<usize>,
    verify_peer: bool,
    root_certificate: Option<Certificate>,
    user_agent: String,
    use_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            redirect_limit: None,
            verify_peer: true,
            root_certificate: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    /// Whole-request timeout; `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of redirects to follow; `None` never follows.
    pub fn redirect_limit(mut self, limit: Option<usize>) -> Self {
        self.redirect_limit = limit;
        self
    }

    /// Verify the server certificate chain. Enabled by default.
    ///
    /// When disabled the certificate must still match the host name.
    pub fn verify_peer(mut self, enabled: bool) -> Self {
        self.verify_peer = enabled;
        self
    }

    /// Trust an additional CA certificate.
    pub fn root_certificate(mut self, certificate: Option<Certificate>) -> Self {
        self.root_certificate = certificate;
        self
    }

    /// User agent header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Honour the system proxy configuration. Enabled by default.
    pub fn use_proxy(mut self, enabled: bool) -> Self {
        self.use_proxy = enabled;
        self
    }

    /// Build the client. Fails with `CloudApiError::Config`.
    pub fn build(self) -> Result<HttpClient> {
        let policy = match self.redirect_limit {
            Some(limit) => Policy::limited(limit),
            None => Policy::none(),
        };

        let mut builder = ReqwestClient::builder().redirect(policy).user_agent(self.user_agent);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(certificate) = self.root_certificate {
            builder = builder.add_root_certificate(certificate);
        }

        if !self.verify_peer {
            // chain is not validated, host name still is
            builder = builder.use_preconfigured_tls(hostname_only_config()?);
        }

        if !self.use_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|err| {
            CloudApiError::Config(format!("Failed to build HTTP client: {}", err))
        })?;

        Ok(HttpClient { client })
    }
}

/// URL without userinfo, for logging.
fn redacted(url: &url::Url) -> String {
    let mut shown = url.clone();
    let _ = shown.set_password(None);
    let _ = shown.set_username("");
    shown.to_string()
}
