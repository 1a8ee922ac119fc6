//! TTL snapshot cache in front of a session source.
//!
//! One entry per [`FetchScope`]. An entry is reused until its time-to-live
//! runs out and is then fetched again; there is no write path, so nothing
//! else invalidates it. Concurrent callers asking for the same scope share a
//! single fetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashboard_core::{Dataset, Error, Result};
use moka::future::Cache;
use telemetry::{health, metrics};
use tracing::{debug, warn};

use crate::source::{FetchScope, SessionSource};

/// Maximum distinct scopes kept at once.
const SNAPSHOT_CACHE_MAX_CAPACITY: u64 = 64;

/// Memoized snapshots keyed by fetch scope.
#[derive(Clone)]
pub struct SnapshotCache {
    source: Arc<dyn SessionSource>,
    cache: Cache<FetchScope, Arc<Dataset>>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn SessionSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: Cache::builder()
                .max_capacity(SNAPSHOT_CACHE_MAX_CAPACITY)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    /// Returns the cached snapshot for `scope`, fetching it when absent or
    /// expired.
    pub async fn get(&self, scope: FetchScope) -> Result<Arc<Dataset>> {
        let fetched = AtomicBool::new(false);

        let result = self
            .cache
            .try_get_with(scope, async {
                fetched.store(true, Ordering::Relaxed);
                self.fetch(scope).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(dataset) => {
                if !fetched.load(Ordering::Relaxed) {
                    metrics().snapshot_cache_hits.inc();
                    debug!(?scope, rows = dataset.len(), "Snapshot cache hit");
                }
                Ok(dataset)
            }
            Err(e) => {
                metrics().fetch_errors.inc();
                health().store.set_unhealthy(e.to_string());
                warn!(?scope, source = self.source.name(), error = %e, "Snapshot fetch failed");
                Err(match e.as_ref() {
                    Error::Store(msg) => Error::store(msg.clone()),
                    other => Error::store(other.to_string()),
                })
            }
        }
    }

    async fn fetch(&self, scope: FetchScope) -> Result<Dataset> {
        let start = Instant::now();
        let dataset = self.source.fetch(scope).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        metrics().snapshot_fetches.inc();
        metrics().fetch_latency_ms.observe(latency_ms);
        metrics().last_snapshot_rows.set(dataset.len() as u64);
        health().store.set_healthy();

        debug!(
            ?scope,
            source = self.source.name(),
            rows = dataset.len(),
            latency_ms = latency_ms,
            "Fetched snapshot"
        );
        Ok(dataset)
    }

    /// Drops every cached snapshot.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &Arc<dyn SessionSource> {
        &self.source
    }
}
