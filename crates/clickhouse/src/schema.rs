//! ClickHouse table schema for session telemetry.
//!
//! The instrumentation pipeline owns writes to this table; the dashboard
//! only creates it for local development and tests.

use crate::client::ClickHouseClient;
use dashboard_core::{Error, Result};
use tracing::debug;

/// DDL for the session table. `{table}` is replaced with the qualified name.
///
/// Counters are nullable because older rows predate the funnel columns.
pub const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS {table} (
    session_id String,
    started_at DateTime64(3, 'UTC'),
    is_bot Nullable(Bool),

    -- Acquisition
    utm_source Nullable(String),
    device_type LowCardinality(Nullable(String)),
    city Nullable(String),
    country LowCardinality(Nullable(String)),

    -- Engagement
    time_on_site_sec Nullable(Float64),
    scroll_depth_pct Nullable(Float64),
    clicks_total Nullable(UInt32),

    -- Funnel
    clicked_buy Nullable(UInt32),
    initiated_checkout Nullable(UInt32),
    purchased Nullable(UInt32),

    -- Experiments
    hero_variant LowCardinality(Nullable(String)),
    social_proof_variant LowCardinality(Nullable(String)),
    scroll_hook_variant LowCardinality(Nullable(String)),
    hero_test_id LowCardinality(Nullable(String)),
    price_shown Nullable(Float64)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(started_at)
ORDER BY (started_at, session_id)
"#;

/// DDL for the configured session table.
pub fn sessions_table_ddl(qualified_table: &str) -> String {
    CREATE_SESSIONS_TABLE.replace("{table}", qualified_table)
}

/// Creates the database and session table if missing.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    let config = client.config();

    client
        .inner()
        .query(&format!("CREATE DATABASE IF NOT EXISTS {}", config.database))
        .execute()
        .await
        .map_err(|e| Error::store(format!("Failed to create database: {}", e)))?;

    client
        .inner()
        .query(&sessions_table_ddl(&config.qualified_table()))
        .execute()
        .await
        .map_err(|e| Error::store(format!("Failed to execute DDL: {}", e)))?;

    debug!(table = %config.qualified_table(), "ClickHouse schema initialized");
    Ok(())
}
