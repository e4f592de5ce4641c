//! # Structured Logging Module
//!
//! Environment-aware structured logging. Everything goes to stderr so that
//! stdout stays clean for dry-run output.

use crate::config::{LogFormat, LoggingConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
///
/// Filter precedence: `RUST_LOG`, then `logging.level`, then the environment
/// default. Each `-v` raises the default by one level.
pub fn init_structured_logging(environment: &str, settings: &LoggingConfig, verbosity: u8) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directive = std::env::var("RUST_LOG")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| settings.level.clone())
            .unwrap_or_else(|| raise_level(get_log_level(environment), verbosity).to_string());

        let layer = match settings.format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(&directive))
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(&directive))
                .boxed(),
        };

        // A global subscriber may already be set by an embedding application
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::debug!(
            pid = std::process::id(),
            environment = %environment,
            filter = %directive,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "test" => "debug",
        "development" => "debug",
        "production" => "info",
        _ => "info",
    }
}

fn raise_level(level: &'static str, verbosity: u8) -> &'static str {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    let start = LEVELS.iter().position(|l| *l == level).unwrap_or(2);
    LEVELS[(start + verbosity as usize).min(LEVELS.len() - 1)]
}

/// Log structured data for batch operations
pub fn log_batch_operation(
    operation: &str,
    sink: &str,
    batch_number: u64,
    item_count: usize,
    items_flushed: u64,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        sink = %sink,
        batch_number = batch_number,
        item_count = item_count,
        items_flushed = items_flushed,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "📦 BATCH_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
