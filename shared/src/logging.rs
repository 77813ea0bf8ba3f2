//! Shared logging utilities for consistent tracing across the fixture

use crate::types::FixtureId;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Filter applied when `RUST_LOG` is not set
fn default_filter(base_level: &str) -> String {
    format!(
        "validator_fixture={base_level},shared={base_level},validator_output={base_level},reqwest=warn,hyper=warn"
    )
}

/// Initialize tracing subscriber with an optional log level
///
/// `RUST_LOG` takes precedence over the level passed in.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(base_level)));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Initialize tracing subscriber with the default level
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Initialize tracing for tests; safe to call from every test
pub fn init_test_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter("debug")));

    let _ = fmt().with_env_filter(env_filter).with_test_writer().try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for fixture-aware info logging
#[macro_export]
macro_rules! fixture_info {
    ($fixture_id:expr, $($arg:tt)*) => {
        tracing::info!(
            fixture = %$fixture_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for fixture-aware warning logging
#[macro_export]
macro_rules! fixture_warn {
    ($fixture_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            fixture = %$fixture_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for fixture-aware error logging
#[macro_export]
macro_rules! fixture_error {
    ($fixture_id:expr, $($arg:tt)*) => {
        tracing::error!(
            fixture = %$fixture_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for fixture-aware debug logging
#[macro_export]
macro_rules! fixture_debug {
    ($fixture_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            fixture = %$fixture_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(fixture_id: &FixtureId, details: &str) {
    info!(
        fixture = %fixture_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(fixture_id: &FixtureId, reason: &str) {
    info!(
        fixture = %fixture_id,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions that are not propagated
pub fn log_error(fixture_id: &FixtureId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        fixture = %fixture_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}
