//! Arguments of a single dispatched call

use std::fmt;

use cloudapi_domain::CallOptions;
use reqwest::Method;
use serde_json::Value;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

/// Destination for raw response bytes when a call streams its body.
pub type ResultStream<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// One call against the control API.
///
/// `resource_path` is already interpolated by the caller; the dispatcher
/// appends `.json` and the query string.
pub struct DispatchRequest<'a> {
    /// Site identifier, alias or canonical
    pub site: String,
    /// HTTP verb
    pub method: Method,
    /// Path below the site endpoint, without `.json`
    pub resource_path: String,
    /// Ordered query pairs
    pub query: Vec<(String, String)>,
    /// JSON body; empty values send nothing
    pub body: Value,
    /// Call-specific options
    pub options: CallOptions,
    /// Sink for the raw body of a successful response
    pub result_stream: Option<ResultStream<'a>>,
    /// Aborts the request when cancelled
    pub cancellation: Option<CancellationToken>,
}

impl<'a> DispatchRequest<'a> {
    /// Call with an arbitrary verb.
    pub fn new(site: impl Into<String>, method: Method, resource_path: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            method,
            resource_path: resource_path.into(),
            query: Vec::new(),
            body: Value::Null,
            options: CallOptions::default(),
            result_stream: None,
            cancellation: None,
        }
    }

    /// `GET` call.
    pub fn get(site: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self::new(site, Method::GET, resource_path)
    }

    /// `POST` call.
    pub fn post(site: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self::new(site, Method::POST, resource_path)
    }

    /// `DELETE` call.
    pub fn delete(site: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self::new(site, Method::DELETE, resource_path)
    }

    /// Append a query parameter. Pairs keep their insertion order.
    pub fn query(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// JSON request body.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = body.into();
        self
    }

    /// Call-specific options, layered over the dispatcher defaults.
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Stream the raw response body into `sink` instead of buffering it.
    pub fn stream_to(mut self, sink: ResultStream<'a>) -> Self {
        self.result_stream = Some(sink);
        self
    }

    /// Abort the in-flight request when `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Serialized body, or `None` when there is nothing to send.
    pub(crate) fn payload(&self) -> Option<Vec<u8>> {
        let empty = match &self.body {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(text) => text.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        (!empty).then(|| self.body.to_string().into_bytes())
    }
}

impl fmt::Debug for DispatchRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRequest")
            .field("site", &self.site)
            .field("method", &self.method)
            .field("resource_path", &self.resource_path)
            .field("query", &self.query)
            .field("options", &self.options)
            .field("streamed", &self.result_stream.is_some())
            .finish_non_exhaustive()
    }
}
