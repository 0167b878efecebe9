//! Buffered HTTP response
//!
//! The body is read once off the wire and kept in memory so callers can
//! inspect it as text and still decode it as JSON afterwards.

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Status, headers and fully buffered body of a completed request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    /// Drain a reqwest response into memory
    pub async fn from_response(response: Response) -> Result<Self> {
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            url,
            headers,
            body,
        })
    }

    /// Build a response from parts (mainly for tests and fakes)
    pub fn from_parts(status: StatusCode, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url: url.into(),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Final request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body as (lossy) UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::decode(format!(
                "{} returned a body that does not match the expected shape: {e}",
                self.url
            ))
        })
    }

    /// Whether the status is in the accepted `[200, 400)` range
    pub fn is_accepted(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    /// Convert into a remote error carrying status, URL and body
    pub fn into_error(self) -> Error {
        Error::remote(self.status.as_u16(), self.url.clone(), self.text())
    }
}
