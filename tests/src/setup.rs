//! Common test setup functions.

use api::{router, state::AppState};
use axum::Router;
use clickhouse_client::{SessionSource, SnapshotCache};
use dashboard::{DashboardOptions, RefreshConfig, RefreshScheduler, Renderer, DEFAULT_PRIMARY_SOURCE};
use dashboard_core::{SessionRecord, Thresholds};
use std::sync::Arc;
use std::time::Duration;

use crate::mocks::MockSource;

/// Test context with an in-memory store behind the real stack.
///
/// This provides the same production code paths by:
/// - Using the real Axum router with all layers
/// - Using the real snapshot cache and renderer
/// - Using MockSource which implements SessionSource
pub struct TestContext {
    pub source: MockSource,
    pub renderer: Arc<Renderer>,
    pub scheduler: RefreshScheduler,
    pub router: Router,
}

impl TestContext {
    /// Context over `records` with a long cache TTL.
    pub fn new(records: Vec<SessionRecord>) -> Self {
        Self::with_ttl(records, Duration::from_secs(60))
    }

    pub fn with_ttl(records: Vec<SessionRecord>, ttl: Duration) -> Self {
        let source = MockSource::with_records(records);
        let cache = SnapshotCache::new(Arc::new(source.clone()) as Arc<dyn SessionSource>, ttl);
        let renderer = Arc::new(Renderer::new(cache, Thresholds::default(), DEFAULT_PRIMARY_SOURCE));

        let (scheduler, live) = RefreshScheduler::new(
            renderer.clone(),
            RefreshConfig::default(),
            DashboardOptions::default(),
        );
        let router = router(AppState::new(renderer.clone(), live));

        Self {
            source,
            renderer,
            scheduler,
            router,
        }
    }

    /// Drop cached snapshots so the next request reads the store.
    pub fn invalidate(&self) {
        self.renderer.cache().invalidate_all();
    }

    /// Set the mock store to fail (for error testing).
    pub fn set_store_failure(&self, should_fail: bool) {
        self.source.set_should_fail(should_fail);
    }
}
