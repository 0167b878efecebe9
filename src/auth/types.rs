//! Auth credential and token types

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Default margin before expiry at which a cached token is treated as stale
pub const DEFAULT_EXPIRY_SKEW_SECONDS: i64 = 30;

/// OAuth2 client credentials, fixed for the lifetime of a client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Client ID
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl Credentials {
    /// Create a new credential set
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Cached token with expiration
#[derive(Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now.
    ///
    /// Returns `None` when the expiry is not representable.
    pub fn expires_in(token: String, seconds: i64) -> Option<Self> {
        let expires_at = Duration::try_seconds(seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))?;
        Some(Self {
            token,
            expires_at: Some(expires_at),
        })
    }

    /// Check if the token is expired, treating the last `skew` as already expired
    pub fn is_expired(&self, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + skew >= expires_at,
            None => false, // No expiration = never expires
        }
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
