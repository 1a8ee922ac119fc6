//! Render pass: fetch, resolve, filter, aggregate.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use clickhouse_client::{FetchScope, SnapshotCache};
use dashboard_core::breakdown::{
    device_breakdown, price_points, recent_sessions, scroll_histogram, sessions_over_time,
    top_cities, CohortSplit, Funnel, Granularity, TrafficOverview,
};
use dashboard_core::thresholds::{RECENT_SESSIONS, TOP_CITIES};
use dashboard_core::{
    calculate_metrics, AbPanel, Dataset, Error, MetricDeltas, PeriodWindows, Result,
    SessionRecord, Thresholds, VariantField,
};
use telemetry::metrics;
use tracing::{debug, info};

use crate::options::DashboardOptions;
use crate::report::{caption, DashboardReport, EngagementSummary};

/// Default highlighted traffic source.
pub const DEFAULT_PRIMARY_SOURCE: &str = "tiktok";

/// Owns the snapshot cache and aggregation settings for render passes.
#[derive(Clone)]
pub struct Renderer {
    cache: SnapshotCache,
    thresholds: Thresholds,
    primary_source: String,
}

impl Renderer {
    pub fn new(cache: SnapshotCache, thresholds: Thresholds, primary_source: impl Into<String>) -> Self {
        Self {
            cache,
            thresholds,
            primary_source: primary_source.into(),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn primary_source(&self) -> &str {
        &self.primary_source
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Runs one full render pass at instant `now`.
    ///
    /// Fails with `EmptyDataset` when the store holds no sessions and with
    /// `Store` when the snapshot cannot be fetched; everything downstream
    /// degrades to zeros or "no comparison" instead of failing.
    pub async fn render(&self, options: &DashboardOptions, now: DateTime<Utc>) -> Result<DashboardReport> {
        let start = Instant::now();
        metrics().renders.inc();

        let dataset = self.cache.get(FetchScope::All).await?;
        let windows = self.resolve(options, now, &dataset)?;
        let report = build_report(&dataset, options, windows, now, &self.thresholds, &self.primary_source);

        let latency_ms = start.elapsed().as_millis() as u64;
        metrics().render_latency_ms.observe(latency_ms);

        info!(
            period = %options.period,
            snapshot_rows = dataset.len(),
            sessions = report.engagement.metrics.sessions,
            latency_ms = latency_ms,
            "Rendered dashboard"
        );
        Ok(report)
    }

    /// Builds one experiment panel over the filtered current window.
    pub async fn ab_panel(
        &self,
        options: &DashboardOptions,
        field: VariantField,
        now: DateTime<Utc>,
    ) -> Result<AbPanel> {
        let dataset = self.cache.get(FetchScope::All).await?;
        let windows = self.resolve(options, now, &dataset)?;

        let chain = options.filter_chain(&self.primary_source);
        let current = chain.apply(in_window(&dataset, windows.current));
        Ok(AbPanel::build(&dataset.with_records(current), field, &self.thresholds))
    }

    /// Filtered raw records in `scope`, newest first, at most `limit`.
    pub async fn sessions(
        &self,
        scope: FetchScope,
        options: &DashboardOptions,
        limit: usize,
    ) -> Result<Vec<SessionRecord>> {
        let dataset = self.cache.get(scope).await?;
        let chain = options.filter_chain(&self.primary_source);
        let filtered = chain.apply(dataset.records());
        debug!(?scope, matched = filtered.len(), limit = limit, "Listing sessions");
        Ok(recent_sessions(&filtered, limit))
    }

    fn resolve(&self, options: &DashboardOptions, now: DateTime<Utc>, dataset: &Dataset) -> Result<PeriodWindows> {
        options.period.resolve(now, dataset).inspect_err(|e| {
            if matches!(e, Error::EmptyDataset) {
                metrics().empty_renders.inc();
            }
        })
    }
}

fn in_window(dataset: &Dataset, window: dashboard_core::Window) -> impl Iterator<Item = &SessionRecord> {
    dataset.records().iter().filter(move |r| window.contains(r.started_at))
}

/// Aggregates a resolved snapshot into a report. Pure and synchronous.
pub fn build_report(
    dataset: &Dataset,
    options: &DashboardOptions,
    windows: PeriodWindows,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
    primary_source: &str,
) -> DashboardReport {
    let chain = options.filter_chain(primary_source);

    let period_records: Vec<SessionRecord> = in_window(dataset, windows.current).cloned().collect();
    let traffic = TrafficOverview::compute(&period_records, primary_source);

    let current = chain.apply(&period_records);
    let current_metrics = calculate_metrics(&current, thresholds);

    let previous_metrics = match windows.previous {
        Some(window) if options.compare => {
            let previous = chain.apply(in_window(dataset, window));
            Some(calculate_metrics(&previous, thresholds))
        }
        _ => None,
    };

    let filtered = dataset.with_records(current.clone());
    let ab_tests = VariantField::PANELS
        .iter()
        .map(|field| AbPanel::build(&filtered, *field, thresholds))
        .collect();

    let granularity = if options.period.is_intraday() {
        Granularity::Hour
    } else {
        Granularity::Day
    };

    let period_label = options.period.label().to_string();
    let filters = chain.tags();

    DashboardReport {
        generated_at: now,
        period: options.period,
        caption: caption(&period_label, &filters, now),
        period_label,
        window: windows.current,
        previous_window: windows.previous,
        filters,
        traffic,
        engagement: EngagementSummary {
            engaged_rate: current_metrics.engaged_rate(),
            deltas: MetricDeltas::compare(&current_metrics, previous_metrics.as_ref()),
            metrics: current_metrics,
            previous: previous_metrics,
        },
        funnel: Funnel::from_metrics(&current_metrics),
        ab_tests,
        granularity,
        sessions_over_time: sessions_over_time(&current, granularity),
        devices: device_breakdown(&current),
        top_cities: top_cities(&current, TOP_CITIES),
        scroll_histogram: scroll_histogram(&current),
        price_points: price_points(&current, thresholds),
        cohorts: options
            .version_cutoff
            .map(|cutoff| CohortSplit::compute(&current, cutoff, thresholds)),
        recent_sessions: recent_sessions(&current, RECENT_SESSIONS),
    }
}

/// Shared handle used by the HTTP layer and the refresh loop.
pub type SharedRenderer = Arc<Renderer>;
