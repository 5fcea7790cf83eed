//! Errors returned by broker, directory and market-data providers.

use thiserror::Error;

/// Failure of a provider call.
///
/// Loaders retry only the variants for which [`TraitError::is_transient`]
/// holds.
#[derive(Debug, Clone, Error)]
pub enum TraitError {
    /// Broker or data endpoint unreachable
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Unknown account or instrument
    #[error("not found: {0}")]
    NotFound(String),

    /// Backing store missing, e.g. an absent data directory
    #[error("source not available: {0}")]
    SourceNotAvailable(String),

    /// Provider-side deadline exceeded
    #[error("timeout")]
    Timeout,

    /// Malformed provider payload
    #[error("parse error: {0}")]
    ParseError(String),

    /// Local file read failure
    #[error("IO error: {0}")]
    IoError(String),

    /// Request rejected as malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Token rejected by the broker
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request quota exhausted
    #[error("rate limited")]
    RateLimited,

    /// Anything else the provider reports
    #[error("internal error: {0}")]
    Internal(String),
}

impl TraitError {
    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TraitError::ConnectionFailed(_) | TraitError::Timeout | TraitError::RateLimited
        )
    }
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TraitError::Timeout.is_transient());
        assert!(TraitError::RateLimited.is_transient());
        assert!(TraitError::ConnectionFailed("reset".into()).is_transient());
        assert!(!TraitError::AuthenticationFailed("bad token".into()).is_transient());
        assert!(!TraitError::ParseError("bad csv".into()).is_transient());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: TraitError = io.into();
        assert!(err.to_string().contains("missing.csv"));
    }
}
