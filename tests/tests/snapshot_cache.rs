//! Snapshot cache behavior seen through the HTTP surface.

use std::time::Duration;

use axum_test::TestServer;
use chrono::Utc;
use integration_tests::fixtures::session_at;
use integration_tests::setup::TestContext;

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

/// Renders within the TTL share one store read
#[tokio::test]
async fn test_renders_reuse_snapshot_within_ttl() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = server(&ctx);

    for period in ["today", "last_7_days", "all_time"] {
        server
            .get("/api/dashboard")
            .add_query_param("period", period)
            .await
            .assert_status_ok();
    }
    server.get("/api/ab/hero_variant").await.assert_status_ok();

    assert_eq!(ctx.source.fetch_count(), 1);
}

/// New rows become visible once the snapshot expires
#[tokio::test]
async fn test_snapshot_expires_after_ttl() {
    let now = Utc::now();
    let ctx = TestContext::with_ttl(vec![session_at(now, 10)], Duration::from_millis(50));
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .json();
    assert_eq!(body["engagement"]["metrics"]["sessions"], 1);

    ctx.source.set_records(vec![session_at(now, 10), session_at(now, 20)]);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .json();
    assert_eq!(body["engagement"]["metrics"]["sessions"], 2);
    assert_eq!(ctx.source.fetch_count(), 2);
}

/// Stale snapshot keeps serving until it expires or is invalidated
#[tokio::test]
async fn test_stale_snapshot_until_invalidated() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![session_at(now, 10)]);
    let server = server(&ctx);

    server.get("/api/dashboard").add_query_param("period", "last_7_days").await;
    ctx.source.set_records(Vec::new());

    server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .assert_status_ok();

    ctx.invalidate();
    server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

/// A `since` listing is cached separately from the full snapshot
#[tokio::test]
async fn test_scopes_are_cached_independently() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![session_at(now, 10)]);
    let server = server(&ctx);

    server.get("/api/sessions").await.assert_status_ok();
    server
        .get("/api/sessions")
        .add_query_param("since", "2024-01-01T00:00:00Z")
        .await
        .assert_status_ok();
    server.get("/api/sessions").await.assert_status_ok();

    assert_eq!(ctx.source.fetch_count(), 2);
}

/// Failed fetches are not cached
#[tokio::test]
async fn test_failure_is_retried() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = server(&ctx);

    ctx.set_store_failure(true);
    server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .assert_status(axum::http::StatusCode::BAD_GATEWAY);

    ctx.set_store_failure(false);
    server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .assert_status_ok();
    assert_eq!(ctx.source.fetch_count(), 2);
}
