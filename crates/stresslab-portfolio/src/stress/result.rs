//! Stress results.

use serde::{Deserialize, Serialize};
use stresslab_traits::InstrumentKey;

/// Greeks of a position row; zero when not computed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionGreeks {
    /// dV/dS per unit of the option
    pub delta: f64,
    /// dV/dSigma per unit of the option
    pub vega: f64,
    /// dV/dr per unit of the option
    pub rho: f64,
}

/// How a position's P&L was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionOutcome {
    /// Market value times the index shock.
    Linear,
    /// Greeks expansion at the shocked spot.
    Option,
    /// Option without spot, strike or remaining life; contributes nothing.
    InsufficientMetadata,
}

/// Stress outcome of one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRiskResult {
    /// Position key
    pub key: InstrumentKey,
    /// Exchange ticker
    pub ticker: String,
    /// Display name
    pub name: String,
    /// Type tag, "option" for options
    pub instrument_type: String,
    /// Signed quantity
    pub quantity: f64,
    /// Last traded price, zero when unknown
    pub last_price: f64,
    /// Market value for display: the position value for linear instruments,
    /// the theoretical value at the shocked spot for priced options
    pub market_value: f64,
    /// Stressed P&L after the crisis multiplier
    pub stress_pnl: f64,
    /// Unit Greeks, zero unless the option was priced
    pub greeks: PositionGreeks,
    /// Evaluation outcome
    pub outcome: PositionOutcome,
}

/// Stress outcome of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    /// Linear market values plus theoretical values of priced options
    pub total_market_value: f64,
    /// Sum of position stress P&L
    pub total_stress_pnl: f64,
    /// 99% historical VaR; absent without enough history
    pub var99: Option<f64>,
    /// 99% historical ES; absent without enough history
    pub es99: Option<f64>,
    /// One row per position, in portfolio order
    pub positions: Vec<PositionRiskResult>,
}

impl StressResult {
    /// At most `limit` rows by descending absolute stress P&L. Equal
    /// magnitudes keep portfolio order.
    #[must_use]
    pub fn top_by_abs_stress_pnl(&self, limit: usize) -> Vec<&PositionRiskResult> {
        let mut rows: Vec<&PositionRiskResult> = self.positions.iter().collect();
        rows.sort_by(|a, b| b.stress_pnl.abs().total_cmp(&a.stress_pnl.abs()));
        rows.truncate(limit);
        rows
    }

    /// Number of options that could not be evaluated.
    #[must_use]
    pub fn insufficient_metadata_count(&self) -> usize {
        self.positions
            .iter()
            .filter(|p| p.outcome == PositionOutcome::InsufficientMetadata)
            .count()
    }

    /// Returns true if VaR and ES were computed.
    #[must_use]
    pub fn has_tail_risk(&self) -> bool {
        self.var99.is_some() && self.es99.is_some()
    }
}
