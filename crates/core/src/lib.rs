//! Core types and aggregation for the SiteNudge dashboard engine.

pub mod ab;
pub mod aggregate;
pub mod breakdown;
pub mod delta;
pub mod error;
pub mod filter;
pub mod period;
pub mod schema;
pub mod session;
pub mod thresholds;

pub use ab::{calculate_ab_stats, ABStats, AbOutcome, AbPanel, LiftReport, VariantField, VariantStats, Verdict};
pub use aggregate::{calculate_metrics, PeriodMetrics};
pub use delta::{delta, Comparison, MetricDeltas};
pub use error::{Error, Result};
pub use filter::{Cohort, FilterChain, SessionFilter};
pub use period::{Period, PeriodWindows, Window};
pub use schema::{Column, Dataset};
pub use session::*;
pub use thresholds::Thresholds;
