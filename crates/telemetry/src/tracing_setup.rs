//! Tracing setup for structured logging.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=warn";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `LOG_JSON=1` or `LOG_JSON=true` selects JSON lines.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("1") | Some("true") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter (e.g., "info", "dashboard=debug")
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// A second call is a no-op, so tests and the binary can both call it.
pub fn init_tracing(config: TracingConfig) {
    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).compact())
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(filter = %config.filter, format = ?config.format, "Tracing initialized");
    }
}

/// Initialize tracing from `RUST_LOG` and `LOG_JSON`.
pub fn init_tracing_from_env() {
    let format = LogFormat::from_env_value(std::env::var("LOG_JSON").ok().as_deref());
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    init_tracing(TracingConfig::new().with_filter(filter).with_format(format));
}
