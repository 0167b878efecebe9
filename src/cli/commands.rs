//! CLI commands and argument parsing

use crate::types::AggregationKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Legacy identity-governance API client
#[derive(Parser, Debug)]
#[command(name = "sailpoint-custom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Tenant API base URL (overrides SAIL_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// OAuth2 client ID (overrides SAIL_CLIENT_ID)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret (overrides SAIL_CLIENT_SECRET)
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Token endpoint (defaults to {base_url}/oauth/token)
    #[arg(long, global = true)]
    pub token_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire an access token and report its expiry
    Token,

    /// Manage source aggregation schedules
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

/// Schedule subcommands
#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Show the current schedule
    Get(ScheduleTarget),

    /// Create or replace the schedule
    Set {
        #[command(flatten)]
        target: ScheduleTarget,

        /// Quartz cron expression (e.g. "0 30 2 * * ?")
        #[arg(long)]
        cron: String,
    },

    /// Disable the schedule
    Delete(ScheduleTarget),
}

/// Source and aggregation kind a schedule command applies to
#[derive(Args, Debug, Clone)]
pub struct ScheduleTarget {
    /// Source cloud ID
    #[arg(short, long)]
    pub source: String,

    /// Aggregation kind
    #[arg(short, long, default_value = "account")]
    pub kind: KindArg,
}

/// Aggregation kind as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// Account aggregation
    Account,
    /// Entitlement aggregation
    Entitlement,
}

impl From<KindArg> for AggregationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Account => AggregationKind::Account,
            KindArg::Entitlement => AggregationKind::Entitlement,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
