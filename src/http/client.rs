//! Authenticated HTTP client
//!
//! Every request carries a bearer token from the [`Authenticator`]; the
//! response body is buffered so it can be replayed by the caller. There is
//! no retry logic: a failed call surfaces immediately.

use super::response::ApiResponse;
use crate::auth::{Authenticator, Credentials};
use crate::error::{Error, Result};
use crate::types::StringMap;
use chrono::Duration as ChronoDuration;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Content type of form-encoded request bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all relative request paths
    pub base_url: String,
    /// Request timeout (None = no timeout beyond the caller's own)
    pub timeout: Option<Duration>,
    /// Margin before expiry at which a cached token is refreshed
    pub token_expiry_skew: ChronoDuration,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Some(Duration::from_secs(30)),
            token_expiry_skew: ChronoDuration::seconds(crate::auth::DEFAULT_EXPIRY_SKEW_SECONDS),
            default_headers: StringMap::new(),
            user_agent: format!("sailpoint-custom/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the client-side timeout
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the token expiry margin
    pub fn token_expiry_skew(mut self, skew: ChronoDuration) -> Self {
        self.config.token_expiry_skew = skew;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Request headers
    pub headers: StringMap,
    /// Pre-serialized request body
    pub body: Option<String>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set a raw body
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set an already URL-encoded form body and its content type
    #[must_use]
    pub fn form(self, encoded: impl Into<String>) -> Self {
        self.header(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE).body(encoded)
    }
}

/// HTTP client that authenticates every call with a cached bearer token
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    base_url: Url,
    authenticator: Authenticator,
}

impl HttpClient {
    /// Create a client for the given base URL and credentials
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::with_config(
            HttpClientConfig::builder().base_url(base_url).build(),
            credentials,
        )
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_value(
                "base_url",
                format!("'{}' cannot be used as a base URL", config.base_url),
            ));
        }

        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let authenticator = Authenticator::with_client(credentials, client.clone())
            .expiry_skew(config.token_expiry_skew);

        Ok(Self {
            client,
            config,
            base_url,
            authenticator,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the authenticator
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.call(Method::GET, path, RequestConfig::default()).await
    }

    /// Make a POST request with a URL-encoded form body
    pub async fn post_form(&self, path: &str, encoded: impl Into<String>) -> Result<ApiResponse> {
        self.call(Method::POST, path, RequestConfig::new().form(encoded))
            .await
    }

    /// Issue an authenticated request.
    ///
    /// Request headers replace default headers of the same name, and the
    /// bearer token always replaces any caller-supplied `Authorization`.
    /// Absolute URLs are accepted only on the base URL's origin, so the
    /// token is never sent to another host.
    ///
    /// Any status outside `[200, 400)` becomes [`Error::Remote`] with the
    /// buffered body attached; a 404 is not treated specially.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse> {
        let full_url = self.build_url(path)?;

        let mut headers = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(&config.headers) {
            let (name, value) = parse_header(key, value)?;
            headers.insert(name, value);
        }
        headers.insert(AUTHORIZATION, self.authenticator.authorization_header().await?);

        let mut req = self
            .client
            .request(method.clone(), full_url.clone())
            .headers(headers);

        if let Some(body) = config.body {
            req = req.body(body);
        }

        debug!(method = %method, url = %full_url, "Sending request");
        let response = ApiResponse::from_response(req.send().await?).await?;

        if !response.is_accepted() {
            warn!(
                method = %method,
                url = %full_url,
                status = response.status().as_u16(),
                "Request returned non-success status"
            );
            return Err(response.into_error());
        }

        debug!(status = response.status().as_u16(), "Request succeeded: {} {}", method, full_url);
        Ok(response)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let url = Url::parse(path)?;
            if url.origin() != self.base_url.origin() {
                return Err(Error::invalid_value(
                    "path",
                    format!("'{path}' is outside the base URL {}", self.base_url),
                ));
            }
            return Ok(url);
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| Error::invalid_value("headers", format!("invalid header name '{key}'")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_value("headers", format!("invalid value for header '{key}'")))?;
    Ok((name, value))
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}
