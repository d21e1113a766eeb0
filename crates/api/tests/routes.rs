//! Router tests.
//!
//! These drive the full router through `tower::ServiceExt::oneshot` with a
//! `MockConnector`, so no Postgres is required. The one exception points a
//! real `PgConnector` at a port nothing listens on.

use std::sync::Arc;
use std::time::Duration;

use api::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use db::mock::{sample_job, MockConnector};
use db::{DbConfig, JobRecord, JobRepository, PgConnector};
use serde_json::Value;
use tower::ServiceExt;

fn app(connector: MockConnector) -> Router {
    router(AppState::new(Arc::new(JobRepository::new(connector))))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_returns_every_joined_record() {
    let app = app(MockConnector::returning(vec![sample_job(1), sample_job(2), sample_job(3)]));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let records = body.as_array().expect("expected a JSON array");
    assert_eq!(records.len(), 3);
    for record in records {
        assert_eq!(record.as_object().unwrap().len(), 25);
    }
    assert_eq!(records[0]["job_post_id"], "JOB-0001");
}

#[tokio::test]
async fn empty_table_returns_empty_array() {
    let app = app(MockConnector::returning(Vec::new()));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn unreachable_database_returns_500_json() {
    let app = app(MockConnector::unreachable());

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "connection_error");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn query_failure_returns_500_and_closes_connection() {
    let connector = MockConnector::failing_query("column \"cig_sagc\" does not exist");
    let tracker = connector.tracker();
    let app = app(connector);

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["kind"], "query_error");
    assert_eq!(tracker.opened(), 1);
    assert_eq!(tracker.open_now(), 0);
}

#[tokio::test(start_paused = true)]
async fn hung_query_returns_500_and_closes_connection() {
    let connector = MockConnector::hanging().with_timeout(Duration::from_secs(5));
    let tracker = connector.tracker();
    let app = app(connector);

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "query_error");
    assert_eq!(body["error"], "query timed out after 5s");
    assert_eq!(tracker.opened(), 1);
    assert_eq!(tracker.open_now(), 0);
}

#[tokio::test]
async fn closed_postgres_port_returns_500_json() {
    let config = DbConfig::new("127.0.0.1", 1, "jobs", "postgres", "postgres")
        .with_timeout(Duration::from_secs(2));
    let store = JobRepository::new(PgConnector::new(config));
    let app = router(AppState::new(Arc::new(store)));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["kind"], "connection_error");
}

#[tokio::test]
async fn concurrent_requests_see_the_same_records() {
    let app = app(MockConnector::returning((1..=5).map(sample_job).collect()));

    let (first, second) = tokio::join!(app.clone().oneshot(get("/")), app.clone().oneshot(get("/")));

    let mut sets = Vec::new();
    for response in [first.unwrap(), second.unwrap()] {
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut records: Vec<JobRecord> = serde_json::from_slice(&bytes).unwrap();
        records.sort_by_key(|r| r.id);
        sets.push(records);
    }
    assert_eq!(sets[0], sets[1]);
    assert_eq!(sets[0].len(), 5);
}

#[tokio::test]
async fn any_origin_is_allowed() {
    let app = app(MockConnector::returning(vec![sample_job(1)]));
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn preflight_is_answered() {
    let app = app(MockConnector::returning(Vec::new()));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .header(header::ORIGIN, "https://careers.example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn healthz_does_not_touch_the_database() {
    let connector = MockConnector::unreachable();
    let tracker = connector.tracker();
    let app = app(connector);

    let response = app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
    assert_eq!(tracker.opened(), 0);
}
