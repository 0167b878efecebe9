//! Client configuration
//!
//! Settings are layered: a JSON or YAML file, then `SAIL_*` environment
//! variables, then explicit overrides (CLI flags). Later layers win.

use crate::auth::{Credentials, DEFAULT_EXPIRY_SKEW_SECONDS};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use crate::schedule::ScheduleClient;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Environment variable holding the tenant base URL
pub const ENV_BASE_URL: &str = "SAIL_BASE_URL";
/// Environment variable holding the OAuth2 client ID
pub const ENV_CLIENT_ID: &str = "SAIL_CLIENT_ID";
/// Environment variable holding the OAuth2 client secret
pub const ENV_CLIENT_SECRET: &str = "SAIL_CLIENT_SECRET";
/// Environment variable overriding the token endpoint
pub const ENV_TOKEN_URL: &str = "SAIL_TOKEN_URL";

/// Connection settings for a tenant
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant API base URL (e.g. `https://acme.api.identitynow.com`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// OAuth2 client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,

    /// Token endpoint (defaults to `{base_url}/oauth/token`)
    #[serde(default)]
    pub token_url: Option<String>,

    /// Request timeout in seconds (0 disables the client-side timeout)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Seconds before expiry at which a cached token is refreshed
    #[serde(default = "default_expiry_skew_seconds")]
    pub token_expiry_skew_seconds: i64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_expiry_skew_seconds() -> i64 {
    DEFAULT_EXPIRY_SKEW_SECONDS
}

impl ClientConfig {
    /// Empty config with default timeouts
    pub fn new() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            token_expiry_skew_seconds: default_expiry_skew_seconds(),
            ..Self::default()
        }
    }

    /// Load a config file; the format is picked from the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") | None => Self::from_json_str(&content),
            Some(other) => Err(Error::config(format!(
                "Unsupported config file extension '.{other}' for {} (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    /// Parse a JSON config
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a YAML config
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_source(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    #[must_use]
    pub fn with_env_source<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = read(ENV_BASE_URL) {
            self.base_url = Some(v);
        }
        if let Some(v) = read(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = read(ENV_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = read(ENV_TOKEN_URL) {
            self.token_url = Some(v);
        }
        self
    }

    /// Overlay another config; fields set in `other` win
    #[must_use]
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.client_id.is_some() {
            self.client_id = other.client_id;
        }
        if other.client_secret.is_some() {
            self.client_secret = other.client_secret;
        }
        if other.token_url.is_some() {
            self.token_url = other.token_url;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        self
    }

    /// Check that every required field is present and well formed
    pub fn validate(&self) -> Result<()> {
        let base_url = required(&self.base_url, "base_url")?;
        required(&self.client_id, "client_id")?;
        required(&self.client_secret, "client_secret")?;

        check_url("base_url", base_url)?;
        if let Some(token_url) = &self.token_url {
            check_url("token_url", token_url)?;
        }
        if self.token_expiry_skew_seconds < 0 {
            return Err(Error::invalid_value(
                "token_expiry_skew_seconds",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// Token endpoint, falling back to `{base_url}/oauth/token`
    pub fn resolved_token_url(&self) -> Result<String> {
        if let Some(token_url) = &self.token_url {
            return Ok(token_url.clone());
        }
        let base_url = required(&self.base_url, "base_url")?;
        Ok(format!("{}/oauth/token", base_url.trim_end_matches('/')))
    }

    /// Client credentials
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials::new(
            required(&self.client_id, "client_id")?,
            required(&self.client_secret, "client_secret")?,
            self.resolved_token_url()?,
        ))
    }

    /// HTTP client settings
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        let mut builder = HttpClientConfig::builder()
            .base_url(required(&self.base_url, "base_url")?)
            .token_expiry_skew(chrono::Duration::seconds(self.token_expiry_skew_seconds));

        builder = if self.timeout_seconds == 0 {
            builder.no_timeout()
        } else {
            builder.timeout(Duration::from_secs(self.timeout_seconds))
        };

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(builder.build())
    }

    /// Validate and build a shareable HTTP client
    pub fn build_http_client(&self) -> Result<Arc<HttpClient>> {
        self.validate()?;
        Ok(Arc::new(HttpClient::with_config(
            self.http_config()?,
            self.credentials()?,
        )?))
    }

    /// Validate and build a schedule client
    pub fn build_schedule_client(&self) -> Result<ScheduleClient> {
        Ok(ScheduleClient::new(self.build_http_client()?))
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::missing_field(field))
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}
