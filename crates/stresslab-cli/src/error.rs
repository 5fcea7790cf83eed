//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A shock value is not a finite number.
    #[error("Invalid {name}: {value}. Must be a finite number.")]
    InvalidShock {
        /// Argument name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Invalid valuation timestamp.
    #[error("Invalid timestamp: {0}. Use RFC 3339, e.g. 2025-01-15T10:00:00Z.")]
    InvalidTimestamp(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data files could not be opened.
    #[error("Data error: {0}")]
    Data(String),

    /// A load or calculation failed.
    #[error("{0}")]
    Engine(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
