//! Request dispatcher
//!
//! Single entry point for every control API call.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cloudapi_domain::constants::{
    is_success_status, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, JSON_CONTENT_TYPE,
    STATUS_NOT_FOUND,
};
use cloudapi_domain::{
    CallContext, CallOptions, CloudApiError, CredentialStore, ResolvedOptions, ResponseEnvelope,
    Result,
};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Certificate, Response};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::query::build_url;
use super::request::{DispatchRequest, ResultStream};
use crate::config::DispatcherConfig;
use crate::http::HttpClient;

/// Dispatches calls against the control API on behalf of the sites in its
/// credential store.
///
/// The credential store, default options and TLS settings are fixed at
/// construction; `dispatch` only reads them, so one instance can serve
/// concurrent callers.
pub struct Dispatcher {
    credentials: Arc<CredentialStore>,
    defaults: CallOptions,
    root_certificate: Option<Certificate>,
    timeout: Option<Duration>,
    user_agent: String,
    use_proxy: bool,
}

impl Dispatcher {
    /// Create a builder for fluent configuration
    pub fn builder(credentials: impl Into<Arc<CredentialStore>>) -> DispatcherBuilder {
        DispatcherBuilder::new(credentials.into())
    }

    /// Create a dispatcher from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `CloudApiError::Config` if the CA bundle cannot be read or
    /// parsed
    pub fn from_config(
        credentials: impl Into<Arc<CredentialStore>>,
        config: &DispatcherConfig,
    ) -> Result<Self> {
        let mut builder = Self::builder(credentials)
            .defaults(config.defaults.clone())
            .timeout(config.timeout_secs.map(Duration::from_secs));
        if let Some(path) = &config.ca_bundle {
            builder = builder.ca_bundle(path.clone());
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Canonical identifier for `site`, following one alias hop.
    ///
    /// # Errors
    ///
    /// Returns `CloudApiError::UnknownSite` for empty or unknown sites
    pub fn resolve_site_name<'a>(&'a self, site: &'a str) -> Result<&'a str> {
        self.credentials.resolve_site_name(site)
    }

    /// `username:password` for `site`.
    ///
    /// # Errors
    ///
    /// Returns `CloudApiError::UnknownSite` if the site has no credential record
    pub fn resolve_credentials(&self, site: &str) -> Result<String> {
        self.credentials.resolve_credentials(site)
    }

    /// Options applied when a call leaves them unset.
    pub fn defaults(&self) -> &CallOptions {
        &self.defaults
    }

    /// Execute one call
    ///
    /// Resolves the site's credentials, sends a Basic-authenticated request to
    /// `<endpoint><resource_path>.json` and maps the response status:
    /// `2xx`/`307` succeed, `404` is `ResourceNotFound`, anything else is
    /// `Api`.
    ///
    /// # Errors
    ///
    /// - `UnknownSite` before any network I/O when the site does not resolve
    /// - `Transport` for connection, TLS, DNS, timeout or streaming failures
    /// - `ResourceNotFound` for HTTP 404
    /// - `Api` for any other non-success status
    /// - `Cancelled` when the request's cancellation token fires
    #[instrument(
        skip(self, request),
        fields(site = %request.site, method = %request.method, path = %request.resource_path)
    )]
    pub async fn dispatch(&self, request: DispatchRequest<'_>) -> Result<ResponseEnvelope> {
        let credentials = self.credentials.credentials_for(&request.site)?;
        let options = request.options.resolve(&self.defaults);
        let payload = request.payload();

        let DispatchRequest { site, method, resource_path, query, result_stream, cancellation, .. } =
            request;

        let url = build_url(&credentials.endpoint, &resource_path, &query);
        let call = CallContext::new(site, method.as_str(), resource_path, query);
        let url = Url::parse(&url).map_err(|err| {
            CloudApiError::Config(format!("Invalid endpoint URL for site {:?}: {}", call.site, err))
        })?;

        let client = self.transport_for(&url, &options)?;
        let mut builder = client
            .request(method, url)
            .basic_auth(&credentials.username, Some(&credentials.password));
        if let Some(payload) = payload {
            builder = builder
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .header(CONTENT_LENGTH, payload.len())
                .body(payload);
        }

        let exchange = Self::exchange(&client, builder, &call, &options, result_stream);
        let envelope = match cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        warn!("request cancelled");
                        Err(CloudApiError::Cancelled { call: Box::new(call.clone()) })
                    }
                    outcome = exchange => outcome,
                }
            }
            None => exchange.await,
        }?;

        info!(status = envelope.status, "control API call succeeded");

        display(&mut std::io::stdout().lock(), &options, &envelope.result);

        Ok(envelope)
    }

    /// Transport for one call. Dropped when the call returns.
    fn transport_for(&self, url: &Url, options: &ResolvedOptions) -> Result<HttpClient> {
        let checked = verify_peer(url, options);
        if !checked {
            warn!("TLS peer verification disabled for this call");
        }

        HttpClient::builder()
            .timeout(options.timeout.or(self.timeout))
            .redirect_limit(options.redirect_limit())
            .verify_peer(checked)
            .root_certificate(self.root_certificate.clone())
            .user_agent(self.user_agent.clone())
            .use_proxy(self.use_proxy)
            .build()
    }

    async fn exchange(
        client: &HttpClient,
        builder: reqwest::RequestBuilder,
        call: &CallContext,
        options: &ResolvedOptions,
        result_stream: Option<ResultStream<'_>>,
    ) -> Result<ResponseEnvelope> {
        let mut response =
            client.send(builder).await.map_err(|err| CloudApiError::transport(call, err))?;

        let status = response.status().as_u16();
        let head = options.include_header.then(|| render_head(&response));

        if !is_success_status(status) {
            let bytes = response.bytes().await.map_err(|err| CloudApiError::transport(call, err))?;
            warn!(status, "control API returned an error status");
            return Err(status_error(status, parse_json(&bytes), call));
        }

        let (result, body_text) = match result_stream {
            Some(sink) => {
                let written = copy_body(&mut response, sink, call).await?;
                debug!(bytes = written, "streamed response body");
                (Value::Null, None)
            }
            None => {
                let bytes =
                    response.bytes().await.map_err(|err| CloudApiError::transport(call, err))?;
                let result = parse_json(&bytes).unwrap_or(Value::Null);
                (result, head.is_some().then(|| String::from_utf8_lossy(&bytes).into_owned()))
            }
        };

        let mut envelope = ResponseEnvelope::new(status, result);
        if let Some(mut content) = head {
            if let Some(text) = body_text {
                content.push_str(&text);
            }
            envelope = envelope.with_content(content);
        }

        Ok(envelope)
    }
}

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    credentials: Arc<CredentialStore>,
    defaults: CallOptions,
    ca_bundle: Option<PathBuf>,
    timeout: Option<Duration>,
    user_agent: String,
    use_proxy: bool,
}

impl DispatcherBuilder {
    fn new(credentials: Arc<CredentialStore>) -> Self {
        Self {
            credentials,
            defaults: CallOptions::default(),
            ca_bundle: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_proxy: true,
        }
    }

    /// Options applied to every call unless the call overrides them
    pub fn defaults(mut self, defaults: CallOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// PEM bundle of additional trusted CAs, applied to every call
    pub fn ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Request timeout used when a call sets none; `None` waits indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// User agent sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Bypass system proxy settings
    pub fn no_proxy(mut self) -> Self {
        self.use_proxy = false;
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    ///
    /// Returns `CloudApiError::Config` if the CA bundle cannot be read or
    /// parsed
    pub fn build(self) -> Result<Dispatcher> {
        let root_certificate = match &self.ca_bundle {
            Some(path) => Some(load_certificate(path)?),
            None => None,
        };

        Ok(Dispatcher {
            credentials: self.credentials,
            defaults: self.defaults,
            root_certificate,
            timeout: self.timeout,
            user_agent: self.user_agent,
            use_proxy: self.use_proxy,
        })
    }
}

fn load_certificate(path: &Path) -> Result<Certificate> {
    let pem = std::fs::read(path).map_err(|err| {
        CloudApiError::Config(format!("Failed to read CA bundle {}: {}", path.display(), err))
    })?;
    let invalid = |reason: String| {
        CloudApiError::Config(format!("Invalid CA bundle {}: {}", path.display(), reason))
    };
    let certificate = Certificate::from_pem(&pem).map_err(|err| invalid(err.to_string()))?;
    // PEM contents are only decoded when a client is built
    HttpClient::builder()
        .root_certificate(Some(certificate.clone()))
        .build()
        .map_err(|err| invalid(err.to_string()))?;
    Ok(certificate)
}

fn status_error(status: u16, body: Option<Value>, call: &CallContext) -> CloudApiError {
    if status == STATUS_NOT_FOUND {
        CloudApiError::ResourceNotFound {
            status: Some(status),
            message: format!("{} returned status {}", call, status),
        }
    } else {
        CloudApiError::Api { status, body, call: Box::new(call.clone()) }
    }
}

fn parse_json(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "response body is not JSON");
            None
        }
    }
}

async fn copy_body(
    response: &mut Response,
    sink: ResultStream<'_>,
    call: &CallContext,
) -> Result<usize> {
    let mut written = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| CloudApiError::transport(call, err))?
    {
        sink.write_all(&chunk).await.map_err(|err| CloudApiError::transport(call, err))?;
        written += chunk.len();
    }
    sink.flush().await.map_err(|err| CloudApiError::transport(call, err))?;
    Ok(written)
}

/// Status line and headers as they would appear on the wire.
fn render_head(response: &Response) -> String {
    let mut head = format!("{:?} {}\r\n", response.version(), response.status());
    for (name, value) in response.headers() {
        head.push_str(&canonical_header_name(name.as_str()));
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    head
}

/// `content-type` -> `Content-Type`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Peer verification only applies to TLS endpoints.
fn verify_peer(url: &Url, options: &ResolvedOptions) -> bool {
    url.scheme() != "https" || !options.no_verify_peer
}

/// Pretty-print `result` to `out` when the `display` option is set.
fn display(out: &mut impl Write, options: &ResolvedOptions, result: &Value) {
    if !options.display {
        return;
    }
    let written = serde_json::to_writer_pretty(&mut *out, result)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(out));
    if let Err(err) = written {
        warn!(error = %err, "failed to display result");
    }
}
