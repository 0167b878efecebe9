//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, ScheduleCommand, ScheduleTarget};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::schedule::{AggregationSchedules, ScheduleClient};
use crate::types::{AggregationKind, JsonValue, ScheduleConfig};
use serde_json::json;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = config.build_schedule_client()?;

        match &self.cli.command {
            Commands::Token => self.token(&client).await,
            Commands::Schedule(command) => self.schedule(&client, command).await,
        }
    }

    /// Layer config file, environment and flags
    fn load_config(&self) -> Result<ClientConfig> {
        let base = match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                ClientConfig::from_file(path)?
            }
            None => ClientConfig::new(),
        };

        let flags = ClientConfig {
            base_url: self.cli.base_url.clone(),
            client_id: self.cli.client_id.clone(),
            client_secret: self.cli.client_secret.clone(),
            token_url: self.cli.token_url.clone(),
            ..ClientConfig::new()
        };

        Ok(base.with_env().merge(flags))
    }

    async fn token(&self, client: &ScheduleClient) -> Result<()> {
        let auth = client.http().authenticator();
        auth.ensure_token().await?;

        let expires_at = auth.cached_expiry().await;
        self.emit(&json!({
            "status": "authenticated",
            "client_id": auth.credentials().client_id,
            "expires_at": expires_at.map(|t| t.to_rfc3339()),
        }));
        Ok(())
    }

    async fn schedule(
        &self,
        schedules: &dyn AggregationSchedules,
        command: &ScheduleCommand,
    ) -> Result<()> {
        match command {
            ScheduleCommand::Get(target) => {
                let kind = AggregationKind::from(target.kind);
                let schedule = schedules.read(kind, &target.source).await?;
                self.emit_schedule(target, schedule.as_ref(), schedule.is_some());
            }
            ScheduleCommand::Set { target, cron } => {
                let kind = AggregationKind::from(target.kind);
                let schedule = schedules.modify(kind, &target.source, cron).await?;
                self.emit_schedule(target, Some(&schedule), true);
            }
            ScheduleCommand::Delete(target) => {
                let kind = AggregationKind::from(target.kind);
                let schedule = schedules.delete(kind, &target.source).await?;
                self.emit_schedule(target, Some(&schedule), false);
            }
        }
        Ok(())
    }

    fn emit_schedule(
        &self,
        target: &ScheduleTarget,
        schedule: Option<&ScheduleConfig>,
        enabled: bool,
    ) {
        let kind = AggregationKind::from(target.kind);
        self.emit(&json!({
            "source": target.source,
            "kind": kind,
            "enabled": enabled,
            "cron_expressions": schedule.map(|s| s.cron_expressions.clone()).unwrap_or_default(),
        }));
    }

    fn emit(&self, value: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => println!("{value}"),
            OutputFormat::Pretty => {
                if let Some(map) = value.as_object() {
                    for (key, val) in map {
                        match val {
                            JsonValue::String(s) => println!("{key}: {s}"),
                            JsonValue::Null => println!("{key}: -"),
                            other => println!("{key}: {other}"),
                        }
                    }
                }
            }
        }
    }
}
