//! Domain types and models

pub mod call;
pub mod credentials;
pub mod envelope;
pub mod options;

pub use call::CallContext;
pub use credentials::{CredentialEntry, CredentialStore, SiteCredentials};
pub use envelope::ResponseEnvelope;
pub use options::{CallOptions, ResolvedOptions};
