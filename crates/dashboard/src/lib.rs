//! Dashboard render pass and auto-refresh.

pub mod options;
pub mod refresh;
pub mod render;
pub mod report;

pub use options::{DashboardOptions, SourceSelection};
pub use refresh::{LiveReport, RefreshConfig, RefreshScheduler};
pub use render::{build_report, Renderer, SharedRenderer, DEFAULT_PRIMARY_SOURCE};
pub use report::{DashboardReport, EngagementSummary};
