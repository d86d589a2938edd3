//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Hosts pick the subscriber; these
//! helpers build the stock one. Use [`subscriber`] with
//! `tracing::subscriber::with_default` for a scoped logger, or
//! [`init_from_env`] to install it process-wide.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Filter used when none is configured or the configured one is invalid.
pub const DEFAULT_FILTER: &str = "info,athome_search=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive string, e.g. "warn,athome_search=debug".
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ATHOME_LOG`: Filter directives (default: "info,athome_search=info")
    /// - `ATHOME_LOG_FORMAT`: "json" or "text" (default: text)
    pub fn from_env() -> Self {
        let filter = std::env::var("ATHOME_LOG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = match std::env::var("ATHOME_LOG_FORMAT") {
            Ok(s) if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self { filter, format }
    }
}

/// Build a formatting subscriber for `config`.
pub fn subscriber(config: &LogConfig) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.finish()),
    }
}

/// Install the stock subscriber globally from environment settings.
///
/// Fails if a global subscriber is already set.
pub fn init_from_env() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(&LogConfig::from_env()))
}
