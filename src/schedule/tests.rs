//! Tests for the schedule module

use super::*;
use crate::auth::Credentials;
use crate::error::Error;
use crate::http::HttpClient;
use crate::types::{AggregationKind, ScheduleConfig, DISABLED_CRON_EXPRESSION};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use test_case::test_case;
use wiremock::matchers::{body_string, header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn schedule_client(server: &MockServer) -> ScheduleClient {
    let credentials = Credentials::new(
        "client",
        "secret",
        format!("{}/oauth/token", server.uri()),
    );
    ScheduleClient::new(Arc::new(
        HttpClient::new(server.uri(), credentials).unwrap(),
    ))
}

/// Responder that remembers the last enabled expression per endpoint suffix
#[derive(Clone, Default)]
struct StatefulSchedules {
    schedules: Arc<Mutex<HashMap<String, String>>>,
}

impl StatefulSchedules {
    fn key(request: &Request) -> String {
        let path = request.url.path();
        let (endpoint, id) = path.rsplit_once('/').unwrap_or((path, ""));
        let kind = if endpoint.contains("Entitlement") {
            "entitlement"
        } else {
            "account"
        };
        format!("{kind}/{id}")
    }
}

impl Respond for StatefulSchedules {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let key = Self::key(request);
        let mut schedules = self.schedules.lock().unwrap();

        if request.method.as_str() == "GET" {
            let body = match schedules.get(&key) {
                Some(cron) => serde_json::json!([{ "cronExpressions": [cron] }]),
                None => serde_json::json!([]),
            };
            return ResponseTemplate::new(200).set_body_json(body);
        }

        let form: HashMap<String, String> = url::form_urlencoded::parse(&request.body)
            .into_owned()
            .collect();
        let cron = form.get("cronExp").cloned().unwrap_or_default();
        if form.get("enable").map(String::as_str) == Some("true") {
            schedules.insert(key, cron.clone());
        } else {
            schedules.remove(&key);
        }
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cronExpressions": [cron] }))
    }
}

#[tokio::test]
async fn test_get_returns_first_schedule() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/cc/api/source/getAggregationSchedules/src-1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "cronExpressions": ["0 0 1 * * ?", "0 0 13 * * ?"] },
            { "cronExpressions": ["0 0 5 * * ?"] }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let schedule = client
        .read_schedule(AggregationKind::Account, "src-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        schedule.cron_expressions,
        vec!["0 0 1 * * ?".to_string(), "0 0 13 * * ?".to_string()]
    );
}

#[test_case(AggregationKind::Account, "/cc/api/source/getAggregationSchedules/abc123" ; "account")]
#[test_case(AggregationKind::Entitlement, "/cc/api/source/getEntitlementAggregationSchedules/abc123" ; "entitlement")]
#[tokio::test]
async fn test_empty_list_means_no_schedule(kind: AggregationKind, endpoint: &str) {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let schedule = client.read_schedule(kind, "abc123").await.unwrap();

    assert_eq!(schedule, None);
}

#[tokio::test]
async fn test_modify_posts_exact_form() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/cc/api/source/scheduleAggregation/abc123"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("enable=true&cronExp=0+30+2+*+*+%3F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cronExpressions": ["0 30 2 * * ?"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let schedule = client
        .modify_schedule(AggregationKind::Account, "abc123", "0 30 2 * * ?")
        .await
        .unwrap();

    assert_eq!(schedule.first_cron(), Some("0 30 2 * * ?"));
}

#[test_case(AggregationKind::Account, "/cc/api/source/scheduleAggregation/abc123" ; "account")]
#[test_case(AggregationKind::Entitlement, "/cc/api/source/scheduleEntitlementAggregation/abc123" ; "entitlement")]
#[tokio::test]
async fn test_delete_disables_with_default_expression(kind: AggregationKind, endpoint: &str) {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string("enable=false&cronExp=0+0+0+*+*+%3F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cronExpressions": [DISABLED_CRON_EXPRESSION]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let schedule = client.delete_schedule(kind, "abc123").await.unwrap();

    assert_eq!(schedule.first_cron(), Some(DISABLED_CRON_EXPRESSION));
}

#[tokio::test]
async fn test_invalid_cron_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path_regex("^/cc/api/source/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let err = client
        .modify_schedule(AggregationKind::Account, "abc123", "*/5 * * * *")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidCron { .. }));
}

#[test_case("GET" ; "read")]
#[test_case("POST" ; "write")]
#[tokio::test]
async fn test_server_error_surfaces_body(verb: &str) {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method(verb))
        .and(path_regex("^/cc/api/source/.*"))
        .respond_with(ResponseTemplate::new(500).set_body_string("aggregation service unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let err = if verb == "GET" {
        client
            .read_schedule(AggregationKind::Entitlement, "abc123")
            .await
            .unwrap_err()
    } else {
        client
            .modify_schedule(AggregationKind::Entitlement, "abc123", "0 0 3 * * ?")
            .await
            .unwrap_err()
    };

    match err {
        Error::Remote { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "aggregation service unavailable");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_left_to_caller() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/cc/api/source/getAggregationSchedules/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let err = client
        .read_schedule(AggregationKind::Account, "gone")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/cc/api/source/getAggregationSchedules/abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"cronExpressions": []})),
        )
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);
    let err = client
        .read_schedule(AggregationKind::Account, "abc123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_modify_then_read_round_trip() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(path_regex("^/cc/api/source/.*"))
        .respond_with(StatefulSchedules::default())
        .mount(&mock_server)
        .await;

    let client = schedule_client(&mock_server);

    for kind in AggregationKind::ALL {
        assert_eq!(client.read_schedule(kind, "abc123").await.unwrap(), None);
    }

    client
        .modify_schedule(AggregationKind::Entitlement, "abc123", "0 15 4 * * ?")
        .await
        .unwrap();

    let schedule = client
        .read_schedule(AggregationKind::Entitlement, "abc123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule.first_cron(), Some("0 15 4 * * ?"));

    // The account schedule is a separate endpoint
    assert_eq!(
        client
            .read_schedule(AggregationKind::Account, "abc123")
            .await
            .unwrap(),
        None
    );

    client
        .delete_schedule(AggregationKind::Entitlement, "abc123")
        .await
        .unwrap();
    assert_eq!(
        client
            .read_schedule(AggregationKind::Entitlement, "abc123")
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_trait_object_dispatch() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(path_regex("^/cc/api/source/.*"))
        .respond_with(StatefulSchedules::default())
        .mount(&mock_server)
        .await;

    let schedules: Arc<dyn AggregationSchedules> = Arc::new(schedule_client(&mock_server));

    schedules
        .modify(AggregationKind::Account, "src-9", "0 0 6 * * ?")
        .await
        .unwrap();
    let current = schedules
        .read(AggregationKind::Account, "src-9")
        .await
        .unwrap();

    assert_eq!(
        current,
        Some(ScheduleConfig::new(vec!["0 0 6 * * ?".to_string()]))
    );
}

/// In-memory implementation, as resource code would use in its own tests
#[derive(Default)]
struct InMemorySchedules {
    inner: Mutex<HashMap<(AggregationKind, String), ScheduleConfig>>,
}

#[async_trait]
impl AggregationSchedules for InMemorySchedules {
    async fn read(
        &self,
        kind: AggregationKind,
        source_id: &str,
    ) -> crate::Result<Option<ScheduleConfig>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .get(&(kind, source_id.to_string()))
            .cloned())
    }

    async fn modify(
        &self,
        kind: AggregationKind,
        source_id: &str,
        cron_expression: &str,
    ) -> crate::Result<ScheduleConfig> {
        validate_cron(cron_expression)?;
        let config = ScheduleConfig::new(vec![cron_expression.to_string()]);
        self.inner
            .lock()
            .unwrap()
            .insert((kind, source_id.to_string()), config.clone());
        Ok(config)
    }

    async fn delete(
        &self,
        kind: AggregationKind,
        source_id: &str,
    ) -> crate::Result<ScheduleConfig> {
        self.inner
            .lock()
            .unwrap()
            .remove(&(kind, source_id.to_string()));
        Ok(ScheduleConfig::new(vec![DISABLED_CRON_EXPRESSION.to_string()]))
    }
}

#[test]
fn test_in_memory_implementation_satisfies_trait() {
    let schedules: Box<dyn AggregationSchedules> = Box::new(InMemorySchedules::default());

    tokio_test::block_on(async {
        schedules
            .modify(AggregationKind::Account, "s", "0 0 2 * * ?")
            .await
            .unwrap();
        assert!(schedules
            .read(AggregationKind::Account, "s")
            .await
            .unwrap()
            .is_some());

        schedules.delete(AggregationKind::Account, "s").await.unwrap();
        assert!(schedules
            .read(AggregationKind::Account, "s")
            .await
            .unwrap()
            .is_none());
    });
}
