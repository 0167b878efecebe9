//! Authentication module
//!
//! OAuth2 client-credentials grant against the tenant's token endpoint.
//!
//! The `Authenticator` caches the bearer token and refreshes it only when
//! it is missing or past expiry. Refreshes are serialized so concurrent
//! callers share a single token request.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{CachedToken, Credentials, DEFAULT_EXPIRY_SKEW_SECONDS};
