//! Stress scenario engine.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stresslab_analytics::options::BlackScholes;
use stresslab_analytics::risk::HistoricalRisk;
use stresslab_traits::analytics::{OptionInputs, OptionPricer, TailRiskEstimator};

use super::inputs::StressScenarioInputs;
use super::result::{PositionGreeks, PositionOutcome, PositionRiskResult, StressResult};
use crate::history::PortfolioPnlSeries;
use crate::parallel::maybe_parallel_map;
use crate::types::{InstrumentKind, OptionTerms, Position, StressConfig};
use crate::Portfolio;

/// Weight of the crisis level in the position P&L multiplier.
pub const POSITION_CRISIS_WEIGHT: f64 = 0.25;

/// Weight of the crisis level in the historical series multiplier.
pub const TAIL_CRISIS_WEIGHT: f64 = 0.8;

/// Confidence level of the reported VaR and ES.
pub const TAIL_CONFIDENCE: f64 = 0.99;

/// Shortest P&L series that produces VaR and ES.
pub const MIN_TAIL_RISK_POINTS: usize = 20;

/// Pure stress calculator.
///
/// Holds only immutable collaborators, so one engine can serve concurrent
/// calls over the same portfolio.
#[derive(Clone)]
pub struct StressEngine {
    pricer: Arc<dyn OptionPricer>,
    estimator: Arc<dyn TailRiskEstimator>,
    config: StressConfig,
}

impl Default for StressEngine {
    fn default() -> Self {
        Self::new(Arc::new(BlackScholes), Arc::new(HistoricalRisk))
    }
}

impl fmt::Debug for StressEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StressEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StressEngine {
    /// Creates an engine with the given collaborators.
    #[must_use]
    pub fn new(pricer: Arc<dyn OptionPricer>, estimator: Arc<dyn TailRiskEstimator>) -> Self {
        Self {
            pricer,
            estimator,
            config: StressConfig::default(),
        }
    }

    /// Sets the computation config.
    #[must_use]
    pub fn with_config(mut self, config: StressConfig) -> Self {
        self.config = config;
        self
    }

    /// The computation config.
    #[must_use]
    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Run a scenario over the whole portfolio.
    ///
    /// Every position yields exactly one row, in portfolio order. VaR and ES
    /// are present only when `history` has at least [`MIN_TAIL_RISK_POINTS`]
    /// observations and the estimator accepts it.
    #[must_use]
    pub fn calculate(
        &self,
        portfolio: &Portfolio,
        inputs: &StressScenarioInputs,
        history: Option<&PortfolioPnlSeries>,
        valuation_time: DateTime<Utc>,
    ) -> StressResult {
        let evaluated = maybe_parallel_map(&portfolio.positions, &self.config, |position| {
            self.evaluate_position(position, inputs, valuation_time)
        });

        let mut total_market_value = 0.0;
        let mut total_stress_pnl = 0.0;
        let mut positions = Vec::with_capacity(evaluated.len());
        for (row, value_contribution) in evaluated {
            total_market_value += value_contribution;
            total_stress_pnl += row.stress_pnl;
            positions.push(row);
        }

        let (var99, es99) = self.tail_risk(history, inputs.correlation_crisis);

        StressResult {
            total_market_value,
            total_stress_pnl,
            var99,
            es99,
            positions,
        }
    }

    /// Evaluate one position. Returns the row and its contribution to the
    /// total market value.
    #[must_use]
    pub fn evaluate_position(
        &self,
        position: &Position,
        inputs: &StressScenarioInputs,
        valuation_time: DateTime<Utc>,
    ) -> (PositionRiskResult, f64) {
        let crisis_mul = 1.0 + POSITION_CRISIS_WEIGHT * inputs.correlation_crisis;

        let (raw_pnl, market_value, contribution, greeks, outcome) = match &position.kind {
            InstrumentKind::Linear { .. } => (
                position.market_value * inputs.index_shock,
                position.market_value,
                position.market_value,
                PositionGreeks::default(),
                PositionOutcome::Linear,
            ),
            InstrumentKind::Option(terms) => {
                match self.option_pnl(position.quantity, terms, inputs, valuation_time) {
                    Some((pnl, theo, greeks)) => {
                        (pnl, theo, theo, greeks, PositionOutcome::Option)
                    }
                    None => (
                        0.0,
                        position.market_value,
                        0.0,
                        PositionGreeks::default(),
                        PositionOutcome::InsufficientMetadata,
                    ),
                }
            }
        };

        let row = PositionRiskResult {
            key: position.key.clone(),
            ticker: position.ticker.clone(),
            name: position.name.clone(),
            instrument_type: position.type_tag().to_string(),
            quantity: position.quantity,
            last_price: position.last_price,
            market_value,
            stress_pnl: raw_pnl * crisis_mul,
            greeks,
            outcome,
        };
        (row, contribution)
    }

    /// First-order option P&L at the shocked spot:
    ///
    /// ```text
    /// S' = S (1 + index_shock)
    /// pnl = q m (delta S' index_shock + rho rate_shock + vega vol_shock vol)
    /// ```
    ///
    /// The delta term uses the already shocked spot. Returns `None` when spot,
    /// strike or remaining life is not positive.
    fn option_pnl(
        &self,
        quantity: f64,
        terms: &OptionTerms,
        inputs: &StressScenarioInputs,
        valuation_time: DateTime<Utc>,
    ) -> Option<(f64, f64, PositionGreeks)> {
        let spot = terms.underlying.spot();
        let expiry = terms.time_to_expiry(valuation_time);
        if !(spot > 0.0 && terms.strike > 0.0 && expiry > 0.0) {
            return None;
        }

        let vol = inputs.effective_vol();
        let stressed_spot = spot * (1.0 + inputs.index_shock);
        let pricing = OptionInputs {
            option_type: terms.option_type,
            spot: stressed_spot,
            strike: terms.strike,
            rate: inputs.effective_rate(),
            dividend_yield: inputs.dividend_yield(),
            vol,
            expiry,
        };

        let g = self.pricer.greeks(&pricing);
        let scale = quantity * terms.contract_size;

        let d_spot = stressed_spot * inputs.index_shock;
        let d_rate = inputs.rate_shock;
        let d_sigma = inputs.vol_shock * vol;
        let pnl = scale * (g.delta * d_spot + g.rho * d_rate + g.vega * d_sigma);

        let theo = self.pricer.price(&pricing) * scale;

        Some((
            pnl,
            theo,
            PositionGreeks {
                delta: g.delta,
                vega: g.vega,
                rho: g.rho,
            },
        ))
    }

    /// VaR and ES of the crisis-scaled history.
    #[must_use]
    pub fn tail_risk(
        &self,
        history: Option<&PortfolioPnlSeries>,
        correlation_crisis: f64,
    ) -> (Option<f64>, Option<f64>) {
        let Some(history) = history.filter(|h| h.len() >= MIN_TAIL_RISK_POINTS) else {
            return (None, None);
        };

        let scale = 1.0 + TAIL_CRISIS_WEIGHT * correlation_crisis;
        let scaled: Vec<f64> = history.pnl.iter().map(|x| x * scale).collect();

        (
            self.estimator.value_at_risk(&scaled, TAIL_CONFIDENCE),
            self.estimator.expected_shortfall(&scaled, TAIL_CONFIDENCE),
        )
    }
}
