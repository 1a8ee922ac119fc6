//! Periodic re-render publishing the latest report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashboard_core::thresholds::DEFAULT_SNAPSHOT_TTL_SECS;
use dashboard_core::Result;
use serde::{Deserialize, Serialize};
use telemetry::{health, metrics};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::options::DashboardOptions;
use crate::render::SharedRenderer;
use crate::report::DashboardReport;

/// Latest auto-refreshed report; `None` until the first pass completes.
pub type LiveReport = watch::Receiver<Option<Arc<DashboardReport>>>;

/// Auto-refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    DEFAULT_SNAPSHOT_TTL_SECS
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Re-runs the render pass on a fixed interval.
pub struct RefreshScheduler {
    renderer: SharedRenderer,
    config: RefreshConfig,
    options: DashboardOptions,
    tx: watch::Sender<Option<Arc<DashboardReport>>>,
}

impl RefreshScheduler {
    pub fn new(renderer: SharedRenderer, config: RefreshConfig, options: DashboardOptions) -> (Self, LiveReport) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                renderer,
                config,
                options,
                tx,
            },
            rx,
        )
    }

    /// Another handle on the published report.
    pub fn subscribe(&self) -> LiveReport {
        self.tx.subscribe()
    }

    /// Spawns the loop, or returns `None` when refresh is disabled.
    pub fn start(self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            info!("Auto-refresh disabled");
            return None;
        }

        info!(interval_secs = self.config.interval().as_secs(), "Auto-refresh started");
        Some(tokio::spawn(async move { self.run().await }))
    }

    async fn run(self) {
        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = self.refresh_once().await {
                error!("Auto-refresh error: {}", e);
            }
        }
    }

    /// One render pass with the configured options; publishes on success.
    pub async fn refresh_once(&self) -> Result<Arc<DashboardReport>> {
        metrics().auto_refreshes.inc();

        match self.renderer.render(&self.options, Utc::now()).await {
            Ok(report) => {
                let report = Arc::new(report);
                self.tx.send_replace(Some(report.clone()));
                health().refresh.set_healthy();
                Ok(report)
            }
            Err(e) => {
                health().refresh.set_unhealthy(e.to_string());
                Err(e)
            }
        }
    }
}
