//! Analytic collaborators of the stress engine.
//!
//! - [`OptionPricer`]: closed-form price and Greeks of a European option
//! - [`TailRiskEstimator`]: historical VaR and expected shortfall

use serde::{Deserialize, Serialize};

/// Option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Call option
    Call,
    /// Put option
    Put,
}

impl OptionType {
    /// Map a call flag to an option type.
    pub fn from_is_call(is_call: bool) -> Self {
        if is_call {
            OptionType::Call
        } else {
            OptionType::Put
        }
    }
}

/// First-order and second-order sensitivities of an option price.
///
/// Vega is per unit of volatility and rho per unit of rate, so a 1% move is
/// `vega * 0.01`. Theta is per year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    /// dV/dS
    pub delta: f64,
    /// d2V/dS2
    pub gamma: f64,
    /// dV/dSigma
    pub vega: f64,
    /// dV/dt
    pub theta: f64,
    /// dV/dr
    pub rho: f64,
}

/// Inputs of an analytic option valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionInputs {
    /// Call or put
    pub option_type: OptionType,
    /// Spot price of the underlying
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Continuously compounded risk-free rate
    pub rate: f64,
    /// Continuous dividend yield
    pub dividend_yield: f64,
    /// Annualized volatility
    pub vol: f64,
    /// Time to expiry in years
    pub expiry: f64,
}

/// Trait for analytic option pricers.
pub trait OptionPricer: Send + Sync {
    /// Theoretical price of one unit of the option.
    fn price(&self, inputs: &OptionInputs) -> f64;

    /// Sensitivities of one unit of the option.
    fn greeks(&self, inputs: &OptionInputs) -> Greeks;
}

/// Trait for historical tail-risk estimators.
///
/// Inputs are P&L observations where more negative values are larger
/// losses, and the returned figures follow the same sign convention.
/// Estimators return `None` when the series is empty or `alpha` is not
/// strictly between 0 and 1.
pub trait TailRiskEstimator: Send + Sync {
    /// P&L threshold not breached with probability `alpha`.
    fn value_at_risk(&self, pnl: &[f64], alpha: f64) -> Option<f64>;

    /// Average P&L over the tail beyond the VaR threshold.
    fn expected_shortfall(&self, pnl: &[f64], alpha: f64) -> Option<f64>;
}
