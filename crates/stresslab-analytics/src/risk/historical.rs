//! Historical-simulation VaR and Expected Shortfall.
//!
//! Works directly on P&L observations: losses are negative, and the returned
//! VaR/ES keep that sign, so a 99% VaR of `-1200.0` means one day in a hundred
//! is expected to lose at least 1200.

use serde::{Deserialize, Serialize};
use stresslab_traits::analytics::TailRiskEstimator;

use crate::error::{AnalyticsError, AnalyticsResult};

/// VaR and ES at one confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    /// Value at Risk
    pub var: f64,
    /// Expected Shortfall
    pub es: f64,
    /// Confidence level, e.g. 0.99
    pub confidence: f64,
    /// Number of observations used
    pub observations: usize,
}

impl TailRisk {
    /// Compute VaR and ES in a single sort.
    pub fn from_pnl(pnl: &[f64], confidence: f64) -> AnalyticsResult<Self> {
        let sorted = sorted_pnl(pnl, confidence)?;
        let idx = tail_index(sorted.len(), confidence);
        Ok(Self {
            var: sorted[idx],
            es: tail_mean(&sorted, idx),
            confidence,
            observations: sorted.len(),
        })
    }
}

fn sorted_pnl(pnl: &[f64], confidence: f64) -> AnalyticsResult<Vec<f64>> {
    if pnl.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::outside_unit_interval("confidence", confidence));
    }

    // Ascending: worst days first
    let mut sorted = pnl.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(sorted)
}

/// Index of the VaR observation in the ascending-sorted series.
fn tail_index(len: usize, confidence: f64) -> usize {
    let idx = ((1.0 - confidence) * len as f64).floor() as usize;
    idx.min(len - 1)
}

fn tail_mean(sorted: &[f64], idx: usize) -> f64 {
    let tail = &sorted[..=idx];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Historical VaR of a P&L series at `confidence`.
pub fn historical_var(pnl: &[f64], confidence: f64) -> AnalyticsResult<f64> {
    let sorted = sorted_pnl(pnl, confidence)?;
    Ok(sorted[tail_index(sorted.len(), confidence)])
}

/// Historical Expected Shortfall: mean of observations at or below the VaR.
pub fn historical_expected_shortfall(pnl: &[f64], confidence: f64) -> AnalyticsResult<f64> {
    let sorted = sorted_pnl(pnl, confidence)?;
    let idx = tail_index(sorted.len(), confidence);
    Ok(tail_mean(&sorted, idx))
}

/// Historical-simulation tail-risk estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalRisk;

impl TailRiskEstimator for HistoricalRisk {
    fn value_at_risk(&self, pnl: &[f64], alpha: f64) -> Option<f64> {
        historical_var(pnl, alpha).ok()
    }

    fn expected_shortfall(&self, pnl: &[f64], alpha: f64) -> Option<f64> {
        historical_expected_shortfall(pnl, alpha).ok()
    }
}
