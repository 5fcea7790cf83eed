//! Engine computation settings.

use serde::{Deserialize, Serialize};

/// How the stress engine fans out over positions.
///
/// Rayon is used only with the `parallel` feature, when `parallel` is set and
/// the book has at least `parallel_threshold` positions. Small books stay on
/// the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Allow rayon evaluation.
    pub parallel: bool,

    /// Smallest position count evaluated in parallel.
    pub parallel_threshold: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 256,
        }
    }
}

impl StressConfig {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings that never leave the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Allow or forbid rayon evaluation.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Set the smallest book evaluated in parallel.
    #[must_use]
    pub fn with_threshold(mut self, positions: usize) -> Self {
        self.parallel_threshold = positions;
        self
    }

    /// Whether a book of `positions` entries is evaluated with rayon.
    #[must_use]
    pub fn should_parallelize(&self, positions: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && positions >= self.parallel_threshold
    }
}
