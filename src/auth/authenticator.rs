//! Authenticator implementation
//!
//! Acquires OAuth2 client-credentials tokens and caches them until expiry.

use super::types::{CachedToken, Credentials, DEFAULT_EXPIRY_SKEW_SECONDS};
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator holds the client credentials and the cached bearer token
pub struct Authenticator {
    /// Client credentials
    credentials: Credentials,
    /// Cached bearer token
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// Margin before expiry at which a token is refreshed
    expiry_skew: Duration,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(credentials: Credentials, http_client: Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            expiry_skew: Duration::seconds(DEFAULT_EXPIRY_SKEW_SECONDS),
            http_client,
        }
    }

    /// Set the margin before expiry at which a cached token is refreshed
    #[must_use]
    pub fn expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    /// `Authorization: Bearer <token>` value for the current token
    pub async fn authorization_header(&self) -> Result<HeaderValue> {
        let token = self.ensure_token().await?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::auth("Access token is not a valid header value"))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Get a valid token, fetching a new one if none is cached or it expired
    pub async fn ensure_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired(self.expiry_skew) {
                    debug!("Using cached access token");
                    return Ok(token.token.clone());
                }
            }
        }

        // Need to refresh - acquire write lock
        let mut cached = self.cached_token.write().await;

        // Double-check after acquiring write lock (another task might have refreshed)
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(self.expiry_skew) {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_client_credentials_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a token using the client credentials grant
    async fn fetch_client_credentials_token(&self) -> Result<CachedToken> {
        let Credentials {
            client_id,
            client_secret,
            token_url,
        } = &self.credentials;

        debug!(token_url = %token_url, client_id = %client_id, "Requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token endpoint {token_url} unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Invalid token response: {e}")))?;

        if token_response.access_token.is_empty() {
            return Err(Error::auth("Token response contained an empty access_token"));
        }

        let token = token_response.into_cached_token()?;
        debug!(expires_at = ?token.expires_at, "Access token acquired");
        Ok(token)
    }

    /// Clear the cached token (useful for testing or forced refresh)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Expiry of the currently cached token, if any
    pub async fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cached_token
            .read()
            .await
            .as_ref()
            .and_then(|t| t.expires_at)
    }

    /// Get the configured credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .field("expiry_skew", &self.expiry_skew)
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_cached_token(self) -> Result<CachedToken> {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs)
                .ok_or_else(|| Error::auth(format!("expires_in out of range: {secs}"))),
            None => Ok(CachedToken::new(self.access_token, None)),
        }
    }
}
