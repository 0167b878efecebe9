//! HTTP client module
//!
//! Provides the authenticated client used for the legacy endpoints.
//!
//! # Features
//!
//! - **Bearer Auth**: Token from the auth module attached to every call
//! - **Base URL Joining**: Relative paths resolve against the tenant URL
//! - **Buffered Responses**: Bodies can be read as text and decoded as JSON
//! - **Status Classification**: Anything outside `[200, 400)` is an error

mod client;
mod response;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, FORM_CONTENT_TYPE,
};
pub use response::ApiResponse;
