//! Classification thresholds for session aggregation.
//!
//! These are heuristics carried over from the hand-tuned dashboard, not
//! statistically derived values. They are configurable so a deployment can
//! override them, but the defaults must stay as they are.
//!
//! # Usage Note
//!
//! The constants are the defaults; aggregation code reads the values from a
//! [`Thresholds`] instance so config overrides apply everywhere at once.

use serde::{Deserialize, Serialize};

// === Time On Site ===

/// Upper bound for a session to count toward the median time (30 minutes).
///
/// Longer sessions are runaway tabs, not engagement.
pub const MAX_VALID_TIME_SECS: f64 = 1800.0;

/// Minimum time on site for an engaged session (exclusive).
pub const ENGAGED_MIN_TIME_SECS: f64 = 10.0;

// === Scroll Depth ===

/// Minimum scroll depth for an engaged session (exclusive).
pub const ENGAGED_MIN_SCROLL_PCT: f64 = 25.0;

// === Experiments ===

/// Half-width of the "no clear winner" band around zero lift, in percent.
///
/// Lift inside `[-5, 5]` is reported as no clear winner. This is not a
/// significance test.
pub const LIFT_DEAD_ZONE_PCT: f64 = 5.0;

// === Snapshot Cache ===

/// Default time-to-live of a fetched snapshot (seconds).
pub const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 15;

// === Breakdowns ===

/// Number of cities kept in the top locations list.
pub const TOP_CITIES: usize = 6;

/// Number of records kept in the recent sessions list.
pub const RECENT_SESSIONS: usize = 15;

/// Number of equal-width bins in the scroll depth histogram.
pub const SCROLL_HISTOGRAM_BINS: usize = 10;

/// Configurable aggregation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_max_valid_time")]
    pub max_valid_time_secs: f64,
    #[serde(default = "default_engaged_time")]
    pub engaged_min_time_secs: f64,
    #[serde(default = "default_engaged_scroll")]
    pub engaged_min_scroll_pct: f64,
    #[serde(default = "default_lift_dead_zone")]
    pub lift_dead_zone_pct: f64,
}

fn default_max_valid_time() -> f64 {
    MAX_VALID_TIME_SECS
}

fn default_engaged_time() -> f64 {
    ENGAGED_MIN_TIME_SECS
}

fn default_engaged_scroll() -> f64 {
    ENGAGED_MIN_SCROLL_PCT
}

fn default_lift_dead_zone() -> f64 {
    LIFT_DEAD_ZONE_PCT
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_valid_time_secs: MAX_VALID_TIME_SECS,
            engaged_min_time_secs: ENGAGED_MIN_TIME_SECS,
            engaged_min_scroll_pct: ENGAGED_MIN_SCROLL_PCT,
            lift_dead_zone_pct: LIFT_DEAD_ZONE_PCT,
        }
    }
}
