//! Period-over-period deltas.

use serde::{Deserialize, Serialize};

use crate::aggregate::PeriodMetrics;
use crate::error::{Error, Result};

/// Percent change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero: there is nothing to compare
/// against, which is different from "no change".
pub fn delta(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Like [`delta`], but reports the zero denominator as an error.
pub fn try_delta(current: f64, previous: f64) -> Result<f64> {
    delta(current, previous)
        .ok_or_else(|| Error::undefined_comparison("previous value is zero"))
}

/// Outcome of comparing one metric across periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Comparison {
    Change { percent: f64 },
    NoComparison,
}

impl Comparison {
    /// An undefined comparison renders as "no comparison available".
    pub fn between(current: f64, previous: f64) -> Self {
        try_delta(current, previous).into()
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Change { percent } => Some(*percent),
            Self::NoComparison => None,
        }
    }
}

impl From<Result<f64>> for Comparison {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(percent) => Self::Change { percent },
            Err(_) => Self::NoComparison,
        }
    }
}

/// Deltas shown on the engagement cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDeltas {
    pub sessions: Comparison,
    pub median_time: Comparison,
    pub median_scroll: Comparison,
}

impl MetricDeltas {
    /// Every card reports "no comparison available".
    pub fn unavailable() -> Self {
        Self {
            sessions: Comparison::NoComparison,
            median_time: Comparison::NoComparison,
            median_scroll: Comparison::NoComparison,
        }
    }

    /// Compares current metrics against the previous period, if any.
    pub fn compare(current: &PeriodMetrics, previous: Option<&PeriodMetrics>) -> Self {
        let Some(prev) = previous else {
            return Self::unavailable();
        };
        Self {
            sessions: Comparison::between(current.sessions as f64, prev.sessions as f64),
            median_time: Comparison::between(current.median_time, prev.median_time),
            median_scroll: Comparison::between(current.median_scroll, prev.median_scroll),
        }
    }
}
