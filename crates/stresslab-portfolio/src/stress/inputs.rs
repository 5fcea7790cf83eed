//! Scenario inputs.

use serde::{Deserialize, Serialize};

use crate::types::PricingAssumptions;

/// Lowest volatility handed to the option pricer.
pub const VOL_FLOOR: f64 = 0.0001;

/// Shocks in decimal units plus the portfolio's pricing defaults.
///
/// A new value is produced for every edit; the engine never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScenarioInputs {
    /// Relative equity index move, `-0.12` is a 12% fall.
    pub index_shock: f64,
    /// Relative implied volatility move, `0.40` is +40%.
    pub vol_shock: f64,
    /// Absolute rate move, `0.015` is +150bp.
    pub rate_shock: f64,
    /// Correlation-crisis level in `[0, 1]`.
    pub correlation_crisis: f64,
    /// Pricing defaults the shocks apply to.
    pub assumptions: PricingAssumptions,
}

impl StressScenarioInputs {
    /// Create inputs from decimal shocks.
    #[must_use]
    pub fn new(
        index_shock: f64,
        vol_shock: f64,
        rate_shock: f64,
        correlation_crisis: f64,
        assumptions: PricingAssumptions,
    ) -> Self {
        Self {
            index_shock,
            vol_shock,
            rate_shock,
            correlation_crisis,
            assumptions,
        }
    }

    /// Shocked volatility, floored at [`VOL_FLOOR`].
    #[must_use]
    pub fn effective_vol(&self) -> f64 {
        (self.assumptions.default_vol * (1.0 + self.vol_shock)).max(VOL_FLOOR)
    }

    /// Shocked risk-free rate.
    #[must_use]
    pub fn effective_rate(&self) -> f64 {
        self.assumptions.default_rate + self.rate_shock
    }

    /// Dividend yield; never shocked.
    #[must_use]
    pub fn dividend_yield(&self) -> f64 {
        self.assumptions.default_dividend_yield
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assumptions(vol: f64) -> PricingAssumptions {
        PricingAssumptions {
            default_vol: vol,
            default_rate: 0.10,
            default_dividend_yield: 0.02,
        }
    }

    #[test]
    fn test_effective_vol() {
        let inputs = StressScenarioInputs::new(0.0, 0.4, 0.0, 0.0, assumptions(0.5));
        assert!((inputs.effective_vol() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_vol_floor() {
        let inputs = StressScenarioInputs::new(0.0, 0.0, 0.0, 0.0, assumptions(0.0));
        assert_eq!(inputs.effective_vol(), VOL_FLOOR);

        let crushed = StressScenarioInputs::new(0.0, -1.5, 0.0, 0.0, assumptions(0.3));
        assert_eq!(crushed.effective_vol(), VOL_FLOOR);
    }

    #[test]
    fn test_rate_and_dividend() {
        let inputs = StressScenarioInputs::new(0.0, 0.0, 0.015, 0.0, assumptions(0.5));
        assert!((inputs.effective_rate() - 0.115).abs() < 1e-12);
        assert_eq!(inputs.dividend_yield(), 0.02);
    }
}
