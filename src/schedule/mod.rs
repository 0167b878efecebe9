//! Source aggregation schedules
//!
//! Cron schedules for account and entitlement aggregation live on legacy
//! endpoints outside the generated SDK. Disabling a schedule is a POST to
//! the same endpoint as an update, with `enable=false` and a fixed
//! expression; the service has no delete verb.

mod client;
mod cron;

pub use client::{AggregationSchedules, ScheduleClient};
pub use cron::validate_cron;

#[cfg(test)]
mod tests;
