//! Health check aggregation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Health status for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Component health state.
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    healthy: AtomicBool,
    message: parking_lot::RwLock<Option<String>>,
}

impl ComponentHealth {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            healthy: AtomicBool::new(false),
            message: parking_lot::RwLock::new(None),
        }
    }

    pub fn set_healthy(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        *self.message.write() = None;
    }

    pub fn set_unhealthy(&self, msg: impl Into<String>) {
        self.healthy.store(false, Ordering::Relaxed);
        *self.message.write() = Some(msg.into());
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn message(&self) -> Option<String> {
        self.message.read().clone()
    }

    fn report(&self) -> ComponentHealthReport {
        ComponentHealthReport {
            name: self.name.to_string(),
            healthy: self.is_healthy(),
            message: self.message(),
        }
    }
}

/// Aggregated health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealthReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealthReport {
    pub name: String,
    pub healthy: bool,
    pub message: Option<String>,
}

/// Global health registry.
pub struct HealthRegistry {
    /// Session store (ClickHouse or file)
    pub store: ComponentHealth,
    /// Auto-refresh loop; only reported once it has run
    pub refresh: ComponentHealth,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            store: ComponentHealth::new("store"),
            refresh: ComponentHealth::new("refresh"),
        }
    }

    /// Generate a health report.
    ///
    /// The store decides overall health; a failing refresh loop only
    /// degrades it, since on-demand renders still work.
    pub fn report(&self) -> HealthReport {
        let store = self.store.report();
        let refresh = self.refresh.report();

        let status = if !store.healthy {
            HealthStatus::Unhealthy
        } else if refresh.message.is_some() && !refresh.healthy {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            status,
            components: vec![store, refresh],
        }
    }

    /// Check if the service can serve renders.
    pub fn is_ready(&self) -> bool {
        self.store.is_healthy()
    }

    /// Check if the service is alive.
    pub fn is_alive(&self) -> bool {
        true // Service is running
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global health registry.
pub static HEALTH: std::sync::LazyLock<HealthRegistry> =
    std::sync::LazyLock::new(HealthRegistry::new);

/// Get the global health registry.
pub fn health() -> &'static HealthRegistry {
    &HEALTH
}
