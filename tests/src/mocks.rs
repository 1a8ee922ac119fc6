//! Mock implementations for testing.

use async_trait::async_trait;
use clickhouse_client::{FetchScope, SessionSource};
use dashboard_core::{Dataset, Result, SessionRecord};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory session store.
///
/// Implements the same `SessionSource` trait as the ClickHouse client, so the
/// real cache, renderer and router run on top of it.
#[derive(Clone, Default)]
pub struct MockSource {
    records: Arc<Mutex<Vec<SessionRecord>>>,
    fetches: Arc<AtomicUsize>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        let source = Self::new();
        source.set_records(records);
        source
    }

    /// Replace the stored sessions.
    pub fn set_records(&self, records: Vec<SessionRecord>) {
        *self.records.lock() = records;
    }

    /// Number of fetches that reached the store.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

#[async_trait]
impl SessionSource for MockSource {
    async fn fetch(&self, scope: FetchScope) -> Result<Dataset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if *self.should_fail.lock() {
            return Err(dashboard_core::Error::store("Mock store failure"));
        }

        let records = self
            .records
            .lock()
            .iter()
            .filter(|r| scope.includes(r.started_at))
            .cloned()
            .collect();

        let mut dataset = Dataset::with_all_columns(records);
        dataset.sort_newest_first();
        Ok(dataset)
    }

    async fn check_health(&self) -> bool {
        !*self.should_fail.lock()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_source_scope_and_failure() {
        let now = Utc::now();
        let source = MockSource::with_records(vec![
            SessionRecord::new("old", now - chrono::Duration::days(3)),
            SessionRecord::new("new", now),
        ]);

        let recent = source
            .fetch(FetchScope::Since(now - chrono::Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);

        source.set_should_fail(true);
        assert!(source.fetch(FetchScope::All).await.is_err());
        assert!(!source.check_health().await);
        assert_eq!(source.fetch_count(), 2);
    }
}
