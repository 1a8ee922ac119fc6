//! Internal metrics collection.
//!
//! Cheap atomic counters bumped on the render path and exposed through the
//! health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (last observed value).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the dashboard engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Render metrics
    pub renders: Counter,
    pub empty_renders: Counter,
    pub auto_refreshes: Counter,

    // Snapshot metrics
    pub snapshot_fetches: Counter,
    pub snapshot_cache_hits: Counter,
    pub fetch_errors: Counter,
    pub rows_rejected: Counter,

    // Latency histograms
    pub fetch_latency_ms: Histogram,
    pub render_latency_ms: Histogram,

    // Gauges
    pub last_snapshot_rows: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            renders: self.renders.get(),
            empty_renders: self.empty_renders.get(),
            auto_refreshes: self.auto_refreshes.get(),
            snapshot_fetches: self.snapshot_fetches.get(),
            snapshot_cache_hits: self.snapshot_cache_hits.get(),
            fetch_errors: self.fetch_errors.get(),
            rows_rejected: self.rows_rejected.get(),
            fetch_latency_mean_ms: self.fetch_latency_ms.mean(),
            render_latency_mean_ms: self.render_latency_ms.mean(),
            last_snapshot_rows: self.last_snapshot_rows.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub renders: u64,
    pub empty_renders: u64,
    pub auto_refreshes: u64,
    pub snapshot_fetches: u64,
    pub snapshot_cache_hits: u64,
    pub fetch_errors: u64,
    pub rows_rejected: u64,
    pub fetch_latency_mean_ms: f64,
    pub render_latency_mean_ms: f64,
    pub last_snapshot_rows: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
