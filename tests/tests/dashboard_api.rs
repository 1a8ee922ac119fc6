//! End-to-end tests for the dashboard endpoints.
//!
//! Every test drives the real router, renderer and snapshot cache over an
//! in-memory store. Fixtures sit minutes before "now", so views use the
//! rolling periods to stay independent of the wall-clock date.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, SecondsFormat, Utc};
use integration_tests::fixtures::{bot_at, hero_arm, other_source_at, session_at};
use integration_tests::setup::TestContext;

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

/// Default view: TikTok only, bots excluded
#[tokio::test]
async fn test_dashboard_default_filters() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![
        session_at(now, 10),
        session_at(now, 20),
        bot_at(now, 30),
        other_source_at(now, 40, "instagram"),
    ]);
    let server = server(&ctx);

    let response = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["period"], "last7_days");
    assert_eq!(body["filters"], serde_json::json!(["TikTok", "No Bots"]));
    assert!(body["caption"]
        .as_str()
        .unwrap()
        .starts_with("Last 7 Days • TikTok • No Bots • Updated "));
    assert_eq!(body["traffic"]["total"], 4);
    assert_eq!(body["traffic"]["bots"], 1);
    assert_eq!(body["traffic"]["primary_sessions"], 2);
    assert_eq!(body["engagement"]["metrics"]["sessions"], 2);
    assert_eq!(body["engagement"]["metrics"]["median_time"], 30.0);
    assert_eq!(body["granularity"], "day");
    assert_eq!(body["ab_tests"].as_array().unwrap().len(), 3);
}

/// Previous window is empty, so no session delta can be computed
#[tokio::test]
async fn test_dashboard_delta_without_previous_sessions() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![session_at(now, 10)]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .json();

    assert_eq!(body["engagement"]["deltas"]["sessions"]["status"], "no_comparison");
    assert_eq!(body["engagement"]["previous"]["sessions"], 0);
}

/// Sessions doubled against the previous seven days
#[tokio::test]
async fn test_dashboard_delta_against_previous_window() {
    let now = Utc::now();
    let eight_days = 8 * 24 * 60;
    let ctx = TestContext::new(vec![
        session_at(now, 10),
        session_at(now, 20),
        session_at(now, eight_days),
    ]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await
        .json();

    let sessions = &body["engagement"]["deltas"]["sessions"];
    assert_eq!(sessions["status"], "change");
    assert_eq!(sessions["percent"], 100.0);
}

#[tokio::test]
async fn test_all_time_disables_comparison() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![session_at(now, 10), session_at(now, 60 * 24 * 90)]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "all_time")
        .await
        .json();

    assert!(body["previous_window"].is_null());
    assert!(body["engagement"]["previous"].is_null());
    assert_eq!(body["engagement"]["deltas"]["median_time"]["status"], "no_comparison");
    assert_eq!(body["engagement"]["metrics"]["sessions"], 2);
}

#[tokio::test]
async fn test_unfiltered_view() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![
        session_at(now, 10),
        bot_at(now, 30),
        other_source_at(now, 40, "instagram"),
    ]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .add_query_param("source", "all")
        .add_query_param("exclude_bots", "false")
        .await
        .json();

    assert_eq!(body["filters"], serde_json::json!(["All Traffic"]));
    assert_eq!(body["engagement"]["metrics"]["sessions"], 3);
}

/// Empty store halts the render with DATA_001
#[tokio::test]
async fn test_empty_store_returns_not_found() {
    let ctx = TestContext::new(Vec::new());
    let server = server(&ctx);

    let response = server.get("/api/dashboard").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&serde_json::json!({
        "error": "No data available",
        "code": "DATA_001"
    }));
}

#[tokio::test]
async fn test_unknown_period_is_bad_request() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = server(&ctx);

    let response = server
        .get("/api/dashboard")
        .add_query_param("period", "fortnight")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_store_failure_is_bad_gateway() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    ctx.set_store_failure(true);
    let server = server(&ctx);

    let response = server.get("/api/dashboard").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORE_001");
}

/// Control 5/10 clicks, test 7/10: lift +40%
#[tokio::test]
async fn test_ab_panel_lift() {
    let now = Utc::now();
    let mut records = hero_arm(now, "control", 10, 5);
    records.extend(hero_arm(now, "test", 10, 7));
    let ctx = TestContext::new(records);
    let server = server(&ctx);

    let response = server
        .get("/api/ab/hero_variant")
        .add_query_param("period", "last_7_days")
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Hero Section");
    assert_eq!(body["variants"].as_array().unwrap().len(), 2);
    assert_eq!(body["outcome"]["status"], "compared");
    assert_eq!(body["outcome"]["verdict"], "test_winning");

    let lift = body["outcome"]["lift"].as_f64().unwrap();
    assert!((lift - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_ab_panel_single_arm_is_insufficient() {
    let now = Utc::now();
    let ctx = TestContext::new(hero_arm(now, "control", 4, 1));
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/ab/hero")
        .add_query_param("period", "last_7_days")
        .await
        .json();

    assert_eq!(body["outcome"]["status"], "insufficient_data");
    assert_eq!(body["variants"][0]["variant"], "control");
}

#[tokio::test]
async fn test_ab_panel_unknown_field() {
    let ctx = TestContext::new(vec![session_at(Utc::now(), 10)]);
    let server = server(&ctx);

    let response = server.get("/api/ab/button_color").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sessions_listing() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![
        session_at(now, 10),
        session_at(now, 20),
        session_at(now, 60 * 48),
        bot_at(now, 5),
    ]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/sessions")
        .add_query_param("limit", "2")
        .await
        .json();
    assert_eq!(body["count"], 2);

    let since = (now - Duration::hours(24)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let body: serde_json::Value = server
        .get("/api/sessions")
        .add_query_param("since", since)
        .await
        .json();
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_live_report_after_refresh() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![session_at(now, 10)]);
    let server = server(&ctx);

    server
        .get("/api/dashboard/live")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.scheduler.refresh_once().await.unwrap();

    let response = server.get("/api/dashboard/live").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["period"], "today");
}

/// Source tags keep their case and match stored tags regardless of case
#[tokio::test]
async fn test_mixed_case_source_filter() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![
        other_source_at(now, 10, "Facebook"),
        other_source_at(now, 20, "facebook"),
        session_at(now, 30),
    ]);
    let server = server(&ctx);

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .add_query_param("source", "Facebook")
        .add_query_param("exclude_bots", "false")
        .await
        .json();

    assert_eq!(body["filters"], serde_json::json!(["Facebook"]));
    assert_eq!(body["engagement"]["metrics"]["sessions"], 2);
}

/// A `+00:00` offset sent unescaped decodes to a space and still parses
#[tokio::test]
async fn test_sessions_since_with_unescaped_offset() {
    let now = Utc::now();
    let ctx = TestContext::new(vec![
        session_at(now, 10),
        session_at(now, 20),
        session_at(now, 60 * 48),
    ]);
    let server = server(&ctx);

    let since = (now - Duration::hours(24)).to_rfc3339_opts(SecondsFormat::Secs, false);
    assert!(since.ends_with("+00:00"));

    let response = server.get(&format!("/api/sessions?since={}", since)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);
}
