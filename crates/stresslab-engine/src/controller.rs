//! Scenario inputs in user units and the recalculation step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stresslab_portfolio::{
    Portfolio, PortfolioPnlSeries, PricingAssumptions, StressEngine, StressResult,
    StressScenarioInputs,
};

use crate::display::{DisplayRow, HeaderText};

/// Default row cap of the position grid.
pub const DEFAULT_ROW_LIMIT: usize = 500;

/// Scenario shocks as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockInputs {
    /// Index move in percent, e.g. `-12` for a 12% fall.
    pub index_shock_pct: f64,
    /// Relative volatility move in percent.
    pub vol_shock_pct: f64,
    /// Rate move in basis points.
    pub rate_shock_bps: f64,
    /// Correlation crisis level, nominally 0 to 1.
    pub correlation_crisis: f64,
}

impl Default for ShockInputs {
    fn default() -> Self {
        Self {
            index_shock_pct: -12.0,
            vol_shock_pct: 40.0,
            rate_shock_bps: 150.0,
            correlation_crisis: 0.35,
        }
    }
}

impl ShockInputs {
    /// Sets the index shock in percent.
    #[must_use]
    pub fn with_index_shock_pct(mut self, pct: f64) -> Self {
        self.index_shock_pct = pct;
        self
    }

    /// Sets the volatility shock in percent.
    #[must_use]
    pub fn with_vol_shock_pct(mut self, pct: f64) -> Self {
        self.vol_shock_pct = pct;
        self
    }

    /// Sets the rate shock in basis points.
    #[must_use]
    pub fn with_rate_shock_bps(mut self, bps: f64) -> Self {
        self.rate_shock_bps = bps;
        self
    }

    /// Sets the correlation crisis level.
    #[must_use]
    pub fn with_correlation_crisis(mut self, level: f64) -> Self {
        self.correlation_crisis = level;
        self
    }

    /// Decimal engine inputs: percent / 100, basis points / 10,000.
    pub fn to_scenario(&self, assumptions: PricingAssumptions) -> StressScenarioInputs {
        StressScenarioInputs::new(
            self.index_shock_pct / 100.0,
            self.vol_shock_pct / 100.0,
            self.rate_shock_bps / 10_000.0,
            self.correlation_crisis,
            assumptions,
        )
    }
}

/// Output of one recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recalculation {
    /// Full engine result, every position included.
    pub result: StressResult,
    /// Formatted totals.
    pub header: HeaderText,
    /// At most the row limit, by descending absolute stress P&L.
    pub rows: Vec<DisplayRow>,
}

/// Runs the engine and prepares the display.
#[derive(Debug, Clone)]
pub struct RecalculationController {
    engine: StressEngine,
    row_limit: usize,
}

impl Default for RecalculationController {
    fn default() -> Self {
        Self::new(StressEngine::default())
    }
}

impl RecalculationController {
    /// Creates a controller with the default row limit.
    pub fn new(engine: StressEngine) -> Self {
        Self {
            engine,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// Sets the row cap.
    #[must_use]
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    /// The underlying engine.
    pub fn engine(&self) -> &StressEngine {
        &self.engine
    }

    /// Recompute the scenario for `portfolio`.
    ///
    /// The row cap only limits the display; totals cover every position.
    pub fn recalculate(
        &self,
        portfolio: &Portfolio,
        history: Option<&PortfolioPnlSeries>,
        shocks: &ShockInputs,
        valuation_time: DateTime<Utc>,
    ) -> Recalculation {
        let inputs = shocks.to_scenario(portfolio.assumptions);
        let result = self
            .engine
            .calculate(portfolio, &inputs, history, valuation_time);

        let rows = result
            .top_by_abs_stress_pnl(self.row_limit)
            .into_iter()
            .map(DisplayRow::from_result)
            .collect();
        let header = HeaderText::from_result(&result, &portfolio.base_currency);

        tracing::debug!(
            positions = result.positions.len(),
            insufficient = result.insufficient_metadata_count(),
            total_stress_pnl = result.total_stress_pnl,
            "Recalculated"
        );

        Recalculation {
            result,
            header,
            rows,
        }
    }
}
