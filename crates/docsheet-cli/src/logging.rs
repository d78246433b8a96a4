//! Logging and tracing setup for the docsheet binary
//!
//! Console output goes to stderr so reports on stdout stay clean. An optional
//! JSON layer writes daily rolling files for later inspection.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::Settings;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files should be written
    pub log_dir: PathBuf,

    /// Whether to enable JSON output to files
    pub enable_json_logs: bool,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl LoggingConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            log_dir: settings.log_dir(),
            enable_json_logs: settings.json_logs,
            include_location: cfg!(debug_assertions),
            default_filter: settings.log_filter.clone(),
        }
    }

    /// Raise the default filter to debug for `--verbose`
    pub fn verbose(mut self) -> Self {
        self.default_filter = "info,docsheet=debug,docsheet_interchange=debug,docsheet_driver_mongodb=debug,docsheet_core=debug".to_string();
        self
    }
}

// RUST_LOG takes precedence over the configured filter
fn env_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?)
}

/// Initialize the logging system.
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive until the program exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(env_filter(config)?)
        .boxed();
    let mut layers = vec![console_layer];

    let mut guard = None;
    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "docsheet.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter(config)?)
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).init();

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_enabled = config.enable_json_logs,
        "logging initialized"
    );
    Ok(guard)
}
