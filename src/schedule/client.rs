//! Aggregation schedule operations on the legacy `/cc/api/source` endpoints

use super::cron::validate_cron;
use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{AggregationKind, ScheduleConfig, ScheduleForm};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Read, upsert and disable the cron schedule of a source aggregation.
///
/// Resource implementations depend on this trait rather than on the HTTP
/// client so they can be exercised against an in-memory fake.
#[async_trait]
pub trait AggregationSchedules: Send + Sync {
    /// Current schedule, or `None` when the source has none configured
    async fn read(&self, kind: AggregationKind, source_id: &str)
        -> Result<Option<ScheduleConfig>>;

    /// Create or replace the schedule with a single cron expression
    async fn modify(
        &self,
        kind: AggregationKind,
        source_id: &str,
        cron_expression: &str,
    ) -> Result<ScheduleConfig>;

    /// Disable the schedule
    async fn delete(&self, kind: AggregationKind, source_id: &str) -> Result<ScheduleConfig>;
}

/// Client for the schedule endpoints the generated SDK does not cover
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: Arc<HttpClient>,
}

impl ScheduleClient {
    /// Wrap a shared HTTP client
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Get the underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// GET an endpoint returning a list of schedules and keep the first one
    pub async fn get_scheduled_aggregation(&self, path: &str) -> Result<Option<ScheduleConfig>> {
        let response = self.http.get(path).await?;
        let schedules: Vec<ScheduleConfig> = response.json()?;

        debug!(path, count = schedules.len(), "Fetched aggregation schedules");
        Ok(schedules.into_iter().next())
    }

    /// POST a schedule form and decode the resulting schedule
    pub async fn invoke_scheduled_aggregation(
        &self,
        path: &str,
        form: &ScheduleForm,
    ) -> Result<ScheduleConfig> {
        let response = self.http.post_form(path, form.encode()).await?;
        response.json()
    }

    /// Read the schedule of a source
    pub async fn read_schedule(
        &self,
        kind: AggregationKind,
        source_id: &str,
    ) -> Result<Option<ScheduleConfig>> {
        let path = kind.read_path(source_id)?;
        self.get_scheduled_aggregation(&path).await
    }

    /// Enable the schedule of a source with the given cron expression
    pub async fn modify_schedule(
        &self,
        kind: AggregationKind,
        source_id: &str,
        cron_expression: &str,
    ) -> Result<ScheduleConfig> {
        validate_cron(cron_expression)?;
        let path = kind.schedule_path(source_id)?;

        info!(%kind, source_id, cron_expression, "Scheduling aggregation");
        self.invoke_scheduled_aggregation(&path, &ScheduleForm::enable(cron_expression))
            .await
    }

    /// Disable the schedule of a source
    pub async fn delete_schedule(
        &self,
        kind: AggregationKind,
        source_id: &str,
    ) -> Result<ScheduleConfig> {
        let path = kind.schedule_path(source_id)?;

        info!(%kind, source_id, "Disabling aggregation schedule");
        self.invoke_scheduled_aggregation(&path, &ScheduleForm::disable())
            .await
    }
}

#[async_trait]
impl AggregationSchedules for ScheduleClient {
    async fn read(
        &self,
        kind: AggregationKind,
        source_id: &str,
    ) -> Result<Option<ScheduleConfig>> {
        self.read_schedule(kind, source_id).await
    }

    async fn modify(
        &self,
        kind: AggregationKind,
        source_id: &str,
        cron_expression: &str,
    ) -> Result<ScheduleConfig> {
        self.modify_schedule(kind, source_id, cron_expression).await
    }

    async fn delete(&self, kind: AggregationKind, source_id: &str) -> Result<ScheduleConfig> {
        self.delete_schedule(kind, source_id).await
    }
}
