//! Dashboard over a JSON export instead of ClickHouse.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api::{router, AppState};
use axum_test::TestServer;
use chrono::Utc;
use clickhouse_client::{JsonFileSource, SnapshotCache};
use dashboard::{DashboardOptions, RefreshConfig, RefreshScheduler, Renderer};
use dashboard_core::Thresholds;
use integration_tests::fixtures::export_row;

fn write_export(name: &str, rows: &[serde_json::Value]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sitenudge-export-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, serde_json::to_vec(rows).unwrap()).unwrap();
    path
}

fn server_for(path: &PathBuf) -> TestServer {
    let source = Arc::new(JsonFileSource::new(path.clone()));
    let cache = SnapshotCache::new(source, Duration::from_secs(60));
    let renderer = Arc::new(Renderer::new(cache, Thresholds::default(), "tiktok"));
    let (_scheduler, live) = RefreshScheduler::new(renderer.clone(), RefreshConfig::default(), DashboardOptions::default());
    TestServer::new(router(AppState::new(renderer, live))).expect("Failed to create test server")
}

/// Bad rows are skipped, good rows are rendered with defaults applied
#[tokio::test]
async fn test_export_rows_with_defaults_and_rejects() {
    let now = Utc::now();
    let mut bad = export_row("bad", now);
    bad["scroll_depth_pct"] = serde_json::json!(140);

    let path = write_export(
        "rows",
        &[
            export_row("a", now - chrono::Duration::minutes(5)),
            export_row("b", now - chrono::Duration::minutes(15)),
            bad,
            serde_json::json!({ "session_id": "no-start" }),
        ],
    );
    let server = server_for(&path);

    let response = server
        .get("/api/dashboard")
        .add_query_param("period", "last_7_days")
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total"], 2);
    assert_eq!(body["engagement"]["metrics"]["sessions"], 2);
    assert_eq!(body["engagement"]["metrics"]["median_time"], 42.5);
    assert_eq!(body["engagement"]["metrics"]["clicked_buy"], 2);
    assert_eq!(body["recent_sessions"][0]["session_id"], "a");

    std::fs::remove_file(path).ok();
}

/// Only the hero column is present: the other panels report insufficient data
#[tokio::test]
async fn test_export_missing_variant_columns() {
    let now = Utc::now();
    let path = write_export("columns", &[export_row("a", now - chrono::Duration::minutes(5))]);
    let server = server_for(&path);

    let body: serde_json::Value = server
        .get("/api/ab/social_proof_variant")
        .add_query_param("period", "last_7_days")
        .await
        .json();

    assert_eq!(body["outcome"]["status"], "insufficient_data");
    assert!(body["variants"].as_array().unwrap().is_empty());

    std::fs::remove_file(path).ok();
}
