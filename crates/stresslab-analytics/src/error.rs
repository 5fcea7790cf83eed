//! Error types for analytics operations.

use thiserror::Error;

/// Error type for analytics operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Invalid input parameter
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Value out of bounds
    #[error("{name} value {value} is out of bounds [{min}, {max}]")]
    OutOfBounds {
        /// Name of the parameter that is out of bounds.
        name: &'static str,
        /// The value that was provided.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Not enough observations
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations.
        required: usize,
        /// Number of observations provided.
        actual: usize,
    },
}

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an out-of-bounds error for an open unit interval parameter.
    pub fn outside_unit_interval(name: &'static str, value: f64) -> Self {
        Self::OutOfBounds {
            name,
            value,
            min: 0.0,
            max: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalyticsError::outside_unit_interval("confidence", 1.5);
        assert_eq!(err.to_string(), "confidence value 1.5 is out of bounds [0, 1]");

        let err = AnalyticsError::InsufficientData {
            required: 1,
            actual: 0,
        };
        assert!(err.to_string().contains("at least 1"));
    }
}
