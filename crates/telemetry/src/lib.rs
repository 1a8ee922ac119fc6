//! Internal telemetry for the SiteNudge dashboard engine.
//!
//! Counters and health live in process-wide registries; the render path
//! itself keeps no global state.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
