//! Application state shared across handlers.

use dashboard::{LiveReport, SharedRenderer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Render pass over the snapshot cache
    pub renderer: SharedRenderer,
    /// Latest auto-refresh report
    pub live: LiveReport,
}

impl AppState {
    pub fn new(renderer: SharedRenderer, live: LiveReport) -> Self {
        Self { renderer, live }
    }
}
