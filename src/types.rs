//! Common types used throughout the crate
//!
//! Shared definitions for the legacy aggregation-schedule endpoints.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Aggregation Kind
// ============================================================================

/// Cron expression the remote service expects when a schedule is disabled
pub const DISABLED_CRON_EXPRESSION: &str = "0 0 0 * * ?";

/// Prefix shared by all legacy source endpoints
const SOURCE_API_PREFIX: &str = "/cc/api/source";

/// Which aggregation a schedule drives on a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// Account aggregation
    #[default]
    Account,
    /// Entitlement aggregation
    Entitlement,
}

impl AggregationKind {
    /// All kinds, in a stable order
    pub const ALL: [AggregationKind; 2] = [AggregationKind::Account, AggregationKind::Entitlement];

    /// Endpoint path that lists the schedules for a source
    pub fn read_path(self, source_id: &str) -> Result<String> {
        let source_id = validate_source_id(source_id)?;
        let endpoint = match self {
            AggregationKind::Account => "getAggregationSchedules",
            AggregationKind::Entitlement => "getEntitlementAggregationSchedules",
        };
        Ok(format!("{SOURCE_API_PREFIX}/{endpoint}/{source_id}"))
    }

    /// Endpoint path that creates, updates or disables the schedule of a source
    pub fn schedule_path(self, source_id: &str) -> Result<String> {
        let source_id = validate_source_id(source_id)?;
        let endpoint = match self {
            AggregationKind::Account => "scheduleAggregation",
            AggregationKind::Entitlement => "scheduleEntitlementAggregation",
        };
        Ok(format!("{SOURCE_API_PREFIX}/{endpoint}/{source_id}"))
    }

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::Account => "account",
            AggregationKind::Entitlement => "entitlement",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account" | "accounts" => Ok(AggregationKind::Account),
            "entitlement" | "entitlements" => Ok(AggregationKind::Entitlement),
            other => Err(Error::invalid_value(
                "kind",
                format!("expected 'account' or 'entitlement', got '{other}'"),
            )),
        }
    }
}

/// Source ids are interpolated into a path, so they must be a single plain segment
fn validate_source_id(source_id: &str) -> Result<&str> {
    let trimmed = source_id.trim();
    if trimmed.is_empty() {
        return Err(Error::missing_field("source_id"));
    }
    if trimmed
        .chars()
        .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(Error::invalid_value(
            "source_id",
            format!("'{source_id}' is not a valid path segment"),
        ));
    }
    Ok(trimmed)
}

// ============================================================================
// Schedule Payloads
// ============================================================================

/// Cron schedule attached to one (source, aggregation kind) pair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Cron expressions, in the order the service reports them
    #[serde(default)]
    pub cron_expressions: Vec<String>,
}

impl ScheduleConfig {
    /// Create a schedule from a list of expressions
    pub fn new(cron_expressions: Vec<String>) -> Self {
        Self { cron_expressions }
    }

    /// First cron expression, which is the one the service acts on
    pub fn first_cron(&self) -> Option<&str> {
        self.cron_expressions.first().map(String::as_str)
    }
}

/// Form body accepted by the schedule endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleForm {
    /// Whether the schedule is active
    pub enable: bool,
    /// Cron expression to apply
    pub cron_exp: String,
}

impl ScheduleForm {
    /// Form that enables a schedule with the given expression
    pub fn enable(cron_exp: impl Into<String>) -> Self {
        Self {
            enable: true,
            cron_exp: cron_exp.into(),
        }
    }

    /// Form that disables a schedule.
    ///
    /// The service has no delete verb; disabling requires this exact payload.
    pub fn disable() -> Self {
        Self {
            enable: false,
            cron_exp: DISABLED_CRON_EXPRESSION.to_string(),
        }
    }

    /// URL-encode as `enable=…&cronExp=…`, in that order
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("enable", if self.enable { "true" } else { "false" })
            .append_pair("cronExp", &self.cron_exp)
            .finish()
    }
}
