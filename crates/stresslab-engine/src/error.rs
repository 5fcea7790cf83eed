//! Engine error types.

use std::time::Duration;

use stresslab_portfolio::PortfolioError;
use stresslab_traits::TraitError;
use thiserror::Error;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The provider lists no accounts and none is configured.
    #[error("no brokerage accounts available")]
    NoAccounts,

    /// A load was requested while another one is running.
    #[error("a load is already in progress")]
    LoadInProgress,

    /// An operation needs a loaded portfolio.
    #[error("no portfolio loaded")]
    NoPortfolio,

    /// A provider call failed.
    #[error("{operation} failed: {source}")]
    Upstream {
        /// What was being fetched
        operation: &'static str,
        /// Provider error
        #[source]
        source: TraitError,
    },

    /// A provider call did not complete in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// What was being fetched
        operation: &'static str,
        /// Per-attempt timeout
        after: Duration,
    },

    /// The caller cancelled the load.
    #[error("load cancelled")]
    Cancelled,

    /// Settings could not be read or are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The loaded data did not form a valid portfolio.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}

impl EngineError {
    /// Creates an upstream error.
    pub fn upstream(operation: &'static str, source: TraitError) -> Self {
        Self::Upstream { operation, source }
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Text shown to the user when a load fails.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::NoAccounts => "No accounts are available for these credentials.".into(),
            EngineError::LoadInProgress => "Another load is still running.".into(),
            EngineError::NoPortfolio => "Load a portfolio first.".into(),
            EngineError::Upstream { operation, source } => match source {
                TraitError::AuthenticationFailed(_) => {
                    format!("Authentication failed while loading {operation}.")
                }
                TraitError::RateLimited => {
                    format!("Rate limited while loading {operation}; try again later.")
                }
                other => format!("Could not load {operation}: {other}"),
            },
            EngineError::Timeout { operation, .. } => {
                format!("Timed out while loading {operation}.")
            }
            EngineError::Cancelled => "Load cancelled.".into(),
            EngineError::Config(msg) => format!("Invalid settings: {msg}"),
            EngineError::Portfolio(e) => format!("Portfolio data is invalid: {e}"),
        }
    }
}

impl From<TraitError> for EngineError {
    fn from(e: TraitError) -> Self {
        EngineError::upstream("provider data", e)
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
