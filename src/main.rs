//! SiteNudge Dashboard Engine
//!
//! Read-only analytics over landing-page session telemetry:
//! - Period windows with previous-period comparison
//! - Engagement, funnel and traffic aggregation
//! - A/B experiment lift with a dead-zone verdict
//! - TTL snapshot cache and optional auto-refresh

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use clickhouse_client::{
    ClickHouseClient, ClickHouseConfig, JsonFileSource, SessionSource, SnapshotCache, SourceConfig,
    SourceKind,
};
use dashboard::{DashboardOptions, RefreshConfig, RefreshScheduler, Renderer, DEFAULT_PRIMARY_SOURCE};
use dashboard_core::Thresholds;
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Highlighted traffic source in the overview and default filter
    #[serde(default = "default_primary_source")]
    primary_source: String,

    /// Create the session table on startup (local development)
    #[serde(default)]
    init_schema: bool,

    #[serde(default)]
    source: SourceConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    thresholds: Thresholds,

    #[serde(default)]
    refresh: RefreshConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_primary_source() -> String {
    DEFAULT_PRIMARY_SOURCE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            primary_source: default_primary_source(),
            init_schema: false,
            source: SourceConfig::default(),
            clickhouse: ClickHouseConfig::default(),
            thresholds: Thresholds::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting SiteNudge Dashboard Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        source = ?config.source.kind,
        cache_ttl_secs = config.source.cache_ttl_secs,
        primary_source = %config.primary_source,
        refresh_enabled = config.refresh.enabled,
        "Loaded configuration"
    );

    let source = build_source(&config).await;

    // Check health and update status
    check_health(source.as_ref()).await;

    let cache = SnapshotCache::new(source, Duration::from_secs(config.source.cache_ttl_secs));
    let renderer = Arc::new(Renderer::new(cache, config.thresholds, config.primary_source.clone()));

    let (scheduler, live) = RefreshScheduler::new(
        renderer.clone(),
        config.refresh.clone(),
        DashboardOptions::default(),
    );
    let _refresh_handle = scheduler.start();

    let app = router(AppState::new(renderer, live));

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("DASHBOARD")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Nested parsing is unreliable for underscored field names
    if let Ok(url) = std::env::var("DASHBOARD_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(database) = std::env::var("DASHBOARD_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Ok(table) = std::env::var("DASHBOARD_CLICKHOUSE_TABLE") {
        config.clickhouse.table = table;
    }
    if let Ok(username) = std::env::var("DASHBOARD_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Ok(password) = std::env::var("DASHBOARD_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }
    if let Ok(path) = std::env::var("DASHBOARD_SOURCE_JSON_PATH") {
        config.source.json_path = path.into();
    }
    if let Ok(ttl) = std::env::var("DASHBOARD_CACHE_TTL_SECS") {
        config.source.cache_ttl_secs = ttl
            .parse()
            .context("DASHBOARD_CACHE_TTL_SECS must be an integer")?;
    }

    Ok(config)
}

/// Builds the configured session source.
async fn build_source(config: &Config) -> Arc<dyn SessionSource> {
    match config.source.kind {
        SourceKind::Clickhouse => {
            let client = ClickHouseClient::new(config.clickhouse.clone());

            if config.init_schema {
                if let Err(e) = clickhouse_client::schema::init_schema(&client).await {
                    error!("Failed to initialize ClickHouse schema: {}", e);
                    // Continue anyway - schema might already exist
                }
            }

            Arc::new(client)
        }
        SourceKind::Json => {
            info!(path = %config.source.json_path.display(), "Reading sessions from JSON export");
            Arc::new(JsonFileSource::new(config.source.json_path.clone()))
        }
    }
}

/// Check store health on startup.
async fn check_health(source: &dyn SessionSource) {
    if source.check_health().await {
        health().store.set_healthy();
        info!(source = source.name(), "Session store: healthy");
    } else {
        health().store.set_unhealthy("Connection failed");
        warn!(source = source.name(), "Session store: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
