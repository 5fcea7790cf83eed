//! Error types for portfolio construction.
//!
//! Data-quality problems in positions (missing option metadata, short price
//! history) are never errors; they degrade per position. These variants cover
//! structurally invalid portfolios only.

use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur during portfolio operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// Missing required field during construction.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// Invalid position data.
    #[error("Invalid position '{id}': {reason}")]
    InvalidPosition {
        /// The position key.
        id: String,
        /// The reason the position is invalid.
        reason: String,
    },

    /// Invalid pricing assumption.
    #[error("Invalid assumption {name}: {value}")]
    InvalidAssumption {
        /// Name of the assumption.
        name: String,
        /// The invalid value.
        value: String,
    },

    /// History window that leaves the supported date range.
    #[error("History window of {days} days ending at {to} is out of range")]
    InvalidWindow {
        /// Requested length in days.
        days: u32,
        /// Requested window end.
        to: String,
    },
}

impl PortfolioError {
    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid position error.
    #[must_use]
    pub fn invalid_position(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid assumption error.
    #[must_use]
    pub fn invalid_assumption(name: impl Into<String>, value: f64) -> Self {
        Self::InvalidAssumption {
            name: name.into(),
            value: value.to_string(),
        }
    }
}
