//! Secondary breakdowns that feed the dashboard's charts and tables.

use std::collections::HashMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

use crate::ab::group_first_seen;
use crate::aggregate::{calculate_metrics, rate, PeriodMetrics};
use crate::filter::Cohort;
use crate::session::SessionRecord;
use crate::thresholds::{Thresholds, SCROLL_HISTOGRAM_BINS};

/// Traffic split over the unfiltered period window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficOverview {
    pub total: u64,
    pub bots: u64,
    pub real: u64,
    /// Highlighted source tag (e.g. "tiktok")
    pub primary_source: String,
    /// Non-bot sessions from the primary source
    pub primary_sessions: u64,
    /// Non-bot sessions from every other source
    pub other: u64,
    pub bot_rate: f64,
    /// Primary sessions as a percent of real sessions, when any are real
    pub primary_share: Option<f64>,
}

impl TrafficOverview {
    pub fn compute(records: &[SessionRecord], primary_source: &str) -> Self {
        let total = records.len() as u64;
        let bots = records.iter().filter(|r| r.is_bot).count() as u64;
        let real = total - bots;
        let primary_sessions = records
            .iter()
            .filter(|r| !r.is_bot && r.is_from_source(primary_source))
            .count() as u64;

        Self {
            total,
            bots,
            real,
            primary_source: primary_source.to_string(),
            primary_sessions,
            other: real - primary_sessions,
            bot_rate: rate(bots, total),
            primary_share: (real > 0).then(|| rate(primary_sessions, real)),
        }
    }
}

/// Funnel counts with step rates and drop-off between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    pub sessions: u64,
    pub clicked_buy: u64,
    pub initiated_checkout: u64,
    pub purchased: u64,
    pub click_rate: f64,
    pub checkout_rate: f64,
    pub purchase_rate: f64,
    /// Percent lost from session to buy click; absent without sessions
    pub session_to_buy_dropoff: Option<f64>,
    pub buy_to_checkout_dropoff: Option<f64>,
    pub checkout_to_purchase_dropoff: Option<f64>,
}

impl Funnel {
    pub fn from_metrics(m: &PeriodMetrics) -> Self {
        Self {
            sessions: m.sessions,
            clicked_buy: m.clicked_buy,
            initiated_checkout: m.initiated_checkout,
            purchased: m.purchased,
            click_rate: m.click_rate(),
            checkout_rate: m.checkout_rate(),
            purchase_rate: m.purchase_rate(),
            session_to_buy_dropoff: dropoff(m.clicked_buy, m.sessions),
            buy_to_checkout_dropoff: dropoff(m.initiated_checkout, m.clicked_buy),
            checkout_to_purchase_dropoff: dropoff(m.purchased, m.initiated_checkout),
        }
    }
}

fn dropoff(next: u64, from: u64) -> Option<f64> {
    (from > 0).then(|| (1.0 - next as f64 / from as f64) * 100.0)
}

/// Bucket width for sessions over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    fn step(self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
        }
    }

    pub fn floor(self, at: DateTime<Utc>) -> DateTime<Utc> {
        at.duration_trunc(self.step()).unwrap_or(at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub bucket: DateTime<Utc>,
    pub sessions: u64,
}

/// Session counts per bucket, oldest first. Empty buckets are omitted.
pub fn sessions_over_time(records: &[SessionRecord], granularity: Granularity) -> Vec<TimeBucket> {
    let mut counts: HashMap<DateTime<Utc>, u64> = HashMap::new();
    for r in records {
        *counts.entry(granularity.floor(r.started_at)).or_default() += 1;
    }
    let mut buckets: Vec<_> = counts
        .into_iter()
        .map(|(bucket, sessions)| TimeBucket { bucket, sessions })
        .collect();
    buckets.sort_by_key(|b| b.bucket);
    buckets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

/// Value counts, most frequent first; ties keep first-seen order.
pub fn value_counts<'a, I>(values: I) -> Vec<CountEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut entries: Vec<CountEntry> = Vec::new();
    for value in values {
        match entries.iter_mut().find(|e| e.label == value) {
            Some(e) => e.count += 1,
            None => entries.push(CountEntry {
                label: value.to_string(),
                count: 1,
            }),
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

pub fn device_breakdown(records: &[SessionRecord]) -> Vec<CountEntry> {
    value_counts(records.iter().filter_map(|r| r.device_type.as_deref()))
}

/// Most frequent non-empty cities.
pub fn top_cities(records: &[SessionRecord], limit: usize) -> Vec<CountEntry> {
    let mut cities = value_counts(
        records
            .iter()
            .filter_map(|r| r.city.as_deref())
            .filter(|c| !c.is_empty()),
    );
    cities.truncate(limit);
    cities
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Histogram of non-zero scroll depth over equal bins of [0, 100].
pub fn scroll_histogram(records: &[SessionRecord]) -> Vec<HistogramBin> {
    let width = 100.0 / SCROLL_HISTOGRAM_BINS as f64;
    let mut bins: Vec<HistogramBin> = (0..SCROLL_HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: i as f64 * width,
            upper: (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for r in records.iter().filter(|r| r.has_valid_scroll()) {
        // 100% lands in the last bin
        let idx = ((r.scroll_depth_pct / width) as usize).min(SCROLL_HISTOGRAM_BINS - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Metrics for one price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePointStats {
    pub price: f64,
    pub metrics: PeriodMetrics,
    pub click_rate: f64,
}

/// Metrics per distinct `price_shown`, in first-seen order.
pub fn price_points(records: &[SessionRecord], thresholds: &Thresholds) -> Vec<PricePointStats> {
    group_first_seen(records, |r| r.price_shown)
        .into_iter()
        .map(|(price, members)| {
            let metrics = calculate_metrics(members, thresholds);
            PricePointStats {
                price,
                click_rate: metrics.click_rate(),
                metrics,
            }
        })
        .collect()
}

/// Metrics on each side of a version cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSplit {
    pub cutoff: DateTime<Utc>,
    pub before: PeriodMetrics,
    pub after: PeriodMetrics,
}

impl CohortSplit {
    pub fn compute(records: &[SessionRecord], cutoff: DateTime<Utc>, thresholds: &Thresholds) -> Self {
        let (before, after): (Vec<&SessionRecord>, Vec<&SessionRecord>) = records
            .iter()
            .partition(|r| Cohort::classify(cutoff, r.started_at) == Cohort::Before);

        Self {
            cutoff,
            before: calculate_metrics(before, thresholds),
            after: calculate_metrics(after, thresholds),
        }
    }
}

/// The newest `limit` records.
pub fn recent_sessions(records: &[SessionRecord], limit: usize) -> Vec<SessionRecord> {
    let mut recent: Vec<SessionRecord> = records.to_vec();
    recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    recent.truncate(limit);
    recent
}
