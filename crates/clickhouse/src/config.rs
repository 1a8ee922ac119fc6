//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// ClickHouse client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    /// ClickHouse HTTP URL
    pub url: String,
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Session table name
    #[serde(default = "default_table")]
    pub table: String,
    /// Username (optional)
    pub username: Option<String>,
    /// Password (optional)
    pub password: Option<String>,
}

fn default_database() -> String {
    "sitenudge".to_string()
}

fn default_table() -> String {
    "session_sessions".to_string()
}

impl ClickHouseConfig {
    /// Fully qualified table name.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: default_database(),
            table: default_table(),
            username: None,
            password: None,
        }
    }
}

/// Which store backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Clickhouse,
    Json,
}

/// Session source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Path of the JSON export when `kind = "json"`
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,
    /// Snapshot time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_json_path() -> PathBuf {
    PathBuf::from("data/sessions.json")
}

fn default_cache_ttl_secs() -> u64 {
    dashboard_core::thresholds::DEFAULT_SNAPSHOT_TTL_SECS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            json_path: default_json_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}
