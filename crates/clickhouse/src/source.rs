//! Session sources.
//!
//! The render path only sees [`SessionSource`]; production reads ClickHouse,
//! offline runs read a JSON export, and tests plug in mocks.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashboard_core::{Dataset, Error, Result};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::client::ClickHouseClient;
use crate::query::{fetch_all_sessions, fetch_sessions_since, SessionRow};

/// Which slice of the table to read. Also the snapshot cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchScope {
    /// Every row.
    All,
    /// Rows with `started_at >= T`.
    Since(DateTime<Utc>),
}

impl FetchScope {
    pub fn includes(&self, at: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Since(since) => at >= *since,
        }
    }
}

/// Read-only access to session records.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Reads the scope, newest first.
    async fn fetch(&self, scope: FetchScope) -> Result<Dataset>;

    /// Whether the backing store is reachable.
    async fn check_health(&self) -> bool;

    fn name(&self) -> &'static str;
}

fn rows_to_dataset(rows: Vec<SessionRow>) -> Dataset {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let session_id = row.session_id.clone();
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Skipping session row");
                metrics().rows_rejected.inc();
            }
        }
    }
    Dataset::with_all_columns(records)
}

#[async_trait]
impl SessionSource for ClickHouseClient {
    async fn fetch(&self, scope: FetchScope) -> Result<Dataset> {
        let rows = match scope {
            FetchScope::All => fetch_all_sessions(self).await?,
            FetchScope::Since(since) => fetch_sessions_since(self, since).await?,
        };
        debug!(rows = rows.len(), ?scope, "Fetched sessions from ClickHouse");
        Ok(rows_to_dataset(rows))
    }

    async fn check_health(&self) -> bool {
        crate::health::check_connection(self).await
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }
}

/// Reads a JSON array of session rows from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl SessionSource for JsonFileSource {
    async fn fetch(&self, scope: FetchScope) -> Result<Dataset> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::store(format!("Failed to read {}: {}", self.path.display(), e)))?;

        let (dataset, rejected) = Dataset::from_json_slice(&bytes)?;
        if !rejected.is_empty() {
            metrics().rows_rejected.inc_by(rejected.len() as u64);
        }

        let records = dataset
            .records()
            .iter()
            .filter(|r| scope.includes(r.started_at))
            .cloned()
            .collect();
        let mut dataset = dataset.with_records(records);
        dataset.sort_newest_first();

        debug!(rows = dataset.len(), ?scope, path = %self.path.display(), "Fetched sessions from file");
        Ok(dataset)
    }

    async fn check_health(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
