//! Tests for health check endpoints.
//!
//! Health and metrics are process-wide, so the state transitions live in a
//! single test.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use integration_tests::fixtures::session_at;
use integration_tests::setup::TestContext;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
    assert!(body["store_connected"].is_boolean());
    assert_eq!(body["health"]["components"].as_array().unwrap().len(), 2);
    assert!(body["metrics"]["renders"].is_u64());
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new(Vec::new());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status_ok();
}

/// Readiness follows the outcome of the latest store read
#[tokio::test]
async fn test_readiness_tracks_store() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/api/dashboard").await.assert_status_ok();
    server.get("/health/ready").await.assert_status_ok();

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["store_connected"], true);
    assert!(body["metrics"]["snapshot_fetches"].as_u64().unwrap() >= 1);

    ctx.set_store_failure(true);
    ctx.invalidate();
    server
        .get("/api/dashboard")
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "unhealthy");
}
