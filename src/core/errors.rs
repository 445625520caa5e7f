/*!
 * Error Types
 * Application-level errors with thiserror and miette support
 */

use miette::Diagnostic;
use thiserror::Error;

// Re-export the engine's soft-failure type
pub use crate::memory::MemoryError;

// Re-export the host sampling failure type
pub use crate::monitoring::HostSampleError;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} (expected {expected})")]
    #[diagnostic(
        code(config::invalid_value),
        help("Fix the value or unset the variable to use the default.")
    )]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{key}={value} is out of range [{min}, {max}]")]
    #[diagnostic(
        code(config::out_of_range),
        help("Pick a value inside the allowed range.")
    )]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Errors that end the application
#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    #[diagnostic(
        code(app::terminal),
        help("memtrack needs an interactive terminal (a TTY) with raw mode support.")
    )]
    Terminal(#[from] std::io::Error),

    #[error("Failed to initialize logging: {0}")]
    #[diagnostic(
        code(app::logging),
        help("Check that MEMTRACK_LOG_FILE points to a writable location.")
    )]
    Logging(String),
}

/// Result type for application startup and the UI loop
pub type AppResult<T> = Result<T, AppError>;
