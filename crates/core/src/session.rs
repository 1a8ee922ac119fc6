//! Session record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::thresholds::Thresholds;

/// One tracked browsing session.
///
/// Every field except `session_id` and `started_at` has a defined default,
/// applied once at ingestion (see [`crate::schema`]). Records are never
/// mutated after they are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SessionRecord {
    /// Opaque session identifier
    pub session_id: String,
    /// Session start time, the only ordering and windowing key
    pub started_at: DateTime<Utc>,
    /// Bot classification (null upstream reads as false)
    pub is_bot: bool,
    /// Traffic source tag ("tiktok", "direct", ...)
    pub utm_source: Option<String>,
    pub device_type: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Seconds on site; 0 means no engagement signal
    #[validate(range(min = 0.0))]
    pub time_on_site_sec: f64,
    /// Max scroll depth in percent; 0 means no signal
    #[validate(range(min = 0.0, max = 100.0))]
    pub scroll_depth_pct: f64,
    pub clicks_total: u64,
    pub clicked_buy: u64,
    pub initiated_checkout: u64,
    pub purchased: u64,
    pub hero_variant: Option<String>,
    pub social_proof_variant: Option<String>,
    pub scroll_hook_variant: Option<String>,
    /// Test round identifier for the hero experiment
    pub hero_test_id: Option<String>,
    /// Price point shown to the visitor
    #[validate(range(exclusive_min = 0.0))]
    pub price_shown: Option<f64>,
}

impl SessionRecord {
    /// Creates a record with every optional signal at its default.
    pub fn new(session_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at,
            is_bot: false,
            utm_source: None,
            device_type: None,
            city: None,
            country: None,
            time_on_site_sec: 0.0,
            scroll_depth_pct: 0.0,
            clicks_total: 0,
            clicked_buy: 0,
            initiated_checkout: 0,
            purchased: 0,
            hero_variant: None,
            social_proof_variant: None,
            scroll_hook_variant: None,
            hero_test_id: None,
            price_shown: None,
        }
    }

    /// A bounce has no measured time on site or no measured scroll depth.
    pub fn is_bounce(&self) -> bool {
        self.time_on_site_sec == 0.0 || self.scroll_depth_pct == 0.0
    }

    /// An engaged session exceeds both the time and the scroll threshold.
    pub fn is_engaged(&self, thresholds: &Thresholds) -> bool {
        self.time_on_site_sec > thresholds.engaged_min_time_secs
            && self.scroll_depth_pct > thresholds.engaged_min_scroll_pct
    }

    /// Whether the time on site counts toward the median.
    pub fn has_valid_time(&self, thresholds: &Thresholds) -> bool {
        self.time_on_site_sec > 0.0 && self.time_on_site_sec <= thresholds.max_valid_time_secs
    }

    /// Whether the scroll depth counts toward the median.
    pub fn has_valid_scroll(&self) -> bool {
        self.scroll_depth_pct > 0.0
    }

    /// Source tag comparison, null never matches.
    pub fn is_from_source(&self, source: &str) -> bool {
        self.utm_source.as_deref() == Some(source)
    }
}
