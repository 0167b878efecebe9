//! CLI module
//!
//! Command-line interface for the legacy endpoints.
//!
//! # Commands
//!
//! - `token` - Acquire an access token and report its expiry
//! - `schedule get` - Show a source's aggregation schedule
//! - `schedule set` - Create or replace it
//! - `schedule delete` - Disable it

mod commands;
mod runner;

pub use commands::{Cli, Commands, KindArg, OutputFormat, ScheduleCommand, ScheduleTarget};
pub use runner::Runner;
