//! Rendered dashboard payload.

use chrono::{DateTime, Utc};
use dashboard_core::breakdown::{
    CohortSplit, CountEntry, Funnel, Granularity, HistogramBin, PricePointStats, TimeBucket,
    TrafficOverview,
};
use dashboard_core::{AbPanel, MetricDeltas, Period, PeriodMetrics, SessionRecord, Window};
use serde::{Deserialize, Serialize};

/// Engagement cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub metrics: PeriodMetrics,
    /// Engaged sessions as a percentage of sessions
    pub engaged_rate: f64,
    /// Previous-window metrics, when comparison applies
    pub previous: Option<PeriodMetrics>,
    pub deltas: MetricDeltas,
}

/// One complete render of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub period_label: String,
    pub window: Window,
    pub previous_window: Option<Window>,
    /// Caption tags for the active filters
    pub filters: Vec<String>,
    /// Header line, e.g. "Today • TikTok • No Bots • Updated 14:05"
    pub caption: String,
    pub traffic: TrafficOverview,
    pub engagement: EngagementSummary,
    pub funnel: Funnel,
    pub ab_tests: Vec<AbPanel>,
    pub granularity: Granularity,
    pub sessions_over_time: Vec<TimeBucket>,
    pub devices: Vec<CountEntry>,
    pub top_cities: Vec<CountEntry>,
    pub scroll_histogram: Vec<HistogramBin>,
    pub price_points: Vec<PricePointStats>,
    pub cohorts: Option<CohortSplit>,
    pub recent_sessions: Vec<SessionRecord>,
}

/// Joins the period label, filter tags and render time into the header line.
pub fn caption(period_label: &str, filters: &[String], generated_at: DateTime<Utc>) -> String {
    let mut parts = Vec::with_capacity(filters.len() + 2);
    parts.push(period_label.to_string());
    parts.extend(filters.iter().cloned());
    parts.push(format!("Updated {}", generated_at.format("%H:%M")));
    parts.join(" • ")
}
