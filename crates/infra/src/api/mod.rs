//! Control API client
//!
//! Every public operation funnels through [`Dispatcher::dispatch`], which
//! resolves the site's credentials, builds a Basic-authenticated request
//! against `<endpoint><path>.json`, executes it once and maps the HTTP status
//! onto [`cloudapi_domain::CloudApiError`].
//!
//! # Architecture
//!
//! - One transport per call, built from the merged call options
//! - No retries, no caching: side-effecting calls must never be repeated
//!   behind the caller's back
//! - Structured tracing only; credentials and bodies are never logged

pub mod dispatcher;
pub mod location;
pub mod operations;
pub mod query;
pub mod request;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use location::{extract_location, location_of};
pub use query::{build_url, encode_query};
pub use request::{DispatchRequest, ResultStream};
