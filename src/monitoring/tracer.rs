/*!
 * Structured Tracing
 * Logging setup for a process whose terminal belongs to the UI
 *
 * Features:
 * - `RUST_LOG` filtering (default: info)
 * - JSON output for machine parsing
 * - File output so log lines never corrupt the terminal UI
 */

use crate::core::errors::{AppError, AppResult};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file path; logging is disabled when unset
pub const ENV_LOG_FILE: &str = "MEMTRACK_LOG_FILE";

/// Enables JSON log lines when `1` or `true`
pub const ENV_TRACE_JSON: &str = "MEMTRACK_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMTRACK_LOG_FILE: Append logs to this file (default: logging off)
/// - MEMTRACK_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() -> AppResult<()> {
    let Some(path) = std::env::var_os(ENV_LOG_FILE) else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::Logging(format!("{}: {}", path.to_string_lossy(), e)))?;
    let writer = Mutex::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };
    result.map_err(|e| AppError::Logging(e.to_string()))?;

    info!(json = use_json, "Structured tracing initialized");
    Ok(())
}
