//! # sailpoint-custom
//!
//! Authenticated client for the legacy identity-governance endpoints that
//! the generated SDK does not cover, chiefly the cron schedules driving
//! account and entitlement aggregation on a source.
//!
//! ## Features
//!
//! - **OAuth2 Client Credentials**: Token acquisition with a shared, single-flight cache
//! - **Authenticated Calls**: Bearer auth, base URL joining, buffered responses
//! - **Aggregation Schedules**: Read, upsert and disable per source and aggregation kind
//! - **Layered Config**: File, `SAIL_*` environment variables and CLI flags
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sailpoint_custom::{AggregationKind, ClientConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientConfig::new().with_env().build_schedule_client()?;
//!
//!     client
//!         .modify_schedule(AggregationKind::Account, "abc123", "0 30 2 * * ?")
//!         .await?;
//!
//!     match client.read_schedule(AggregationKind::Account, "abc123").await {
//!         Ok(Some(schedule)) => println!("{:?}", schedule.first_cron()),
//!         Ok(None) => println!("no schedule"),
//!         Err(e) if e.is_not_found() => println!("source is gone"),
//!         Err(e) => return Err(e),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ ScheduleClient (AggregationSchedules)                    │
//! │  read / modify / delete  ×  {account, entitlement}       │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ get / post_form
//! ┌───────────────────────────┴──────────────────────────────┐
//! │ HttpClient::call  → ApiResponse (status, buffered body)  │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ ensure_token
//! ┌───────────────────────────┴──────────────────────────────┐
//! │ Authenticator  (client credentials, cached bearer token) │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // Error enum fields are self-describing

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// OAuth2 client-credentials authentication
pub mod auth;

/// Authenticated HTTP client
pub mod http;

/// Aggregation schedule endpoints
pub mod schedule;

/// Layered client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{Authenticator, Credentials};
pub use config::ClientConfig;
pub use http::{ApiResponse, HttpClient, HttpClientConfig, RequestConfig};
pub use schedule::{AggregationSchedules, ScheduleClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
