//! Black-Scholes-Merton model for European options on a dividend-paying
//! underlying.
//!
//! Degenerate inputs never panic: an expired option is worth its intrinsic
//! value, a zero volatility collapses to the discounted forward payoff, and
//! all Greeks are zero in both cases.

use statrs::function::erf::erfc;
use stresslab_traits::analytics::{Greeks, OptionInputs, OptionPricer, OptionType};

use crate::error::{AnalyticsError, AnalyticsResult};

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

#[inline]
fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

#[inline]
fn d1_d2(inputs: &OptionInputs) -> (f64, f64) {
    let sig_sqrt_t = inputs.vol * inputs.expiry.sqrt();
    let d1 = ((inputs.spot / inputs.strike).ln()
        + (inputs.rate - inputs.dividend_yield + 0.5 * inputs.vol * inputs.vol) * inputs.expiry)
        / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

#[inline]
fn is_degenerate(inputs: &OptionInputs) -> bool {
    inputs.expiry <= 0.0 || inputs.vol <= 0.0 || inputs.spot <= 0.0 || inputs.strike <= 0.0
}

/// Theoretical price of one unit of a European option.
pub fn bs_price(inputs: &OptionInputs) -> f64 {
    let OptionInputs {
        option_type,
        spot,
        strike,
        rate,
        dividend_yield,
        vol,
        expiry,
    } = *inputs;

    if expiry <= 0.0 {
        return intrinsic(option_type, spot, strike);
    }
    let df_r = (-rate * expiry).exp();
    let df_q = (-dividend_yield * expiry).exp();
    if is_degenerate(inputs) {
        return match option_type {
            OptionType::Call => (spot * df_q - strike * df_r).max(0.0),
            OptionType::Put => (strike * df_r - spot * df_q).max(0.0),
        };
    }

    let (d1, d2) = d1_d2(inputs);
    match option_type {
        OptionType::Call => spot * df_q * norm_cdf(d1) - strike * df_r * norm_cdf(d2),
        OptionType::Put => strike * df_r * norm_cdf(-d2) - spot * df_q * norm_cdf(-d1),
    }
}

/// Greeks of one unit of a European option.
///
/// Vega is per unit of volatility, rho per unit of rate and theta per year.
pub fn bs_greeks(inputs: &OptionInputs) -> Greeks {
    if is_degenerate(inputs) {
        return Greeks::default();
    }

    let OptionInputs {
        option_type,
        spot,
        strike,
        rate,
        dividend_yield,
        vol,
        expiry,
    } = *inputs;

    let (d1, d2) = d1_d2(inputs);
    let sqrt_t = expiry.sqrt();
    let df_r = (-rate * expiry).exp();
    let df_q = (-dividend_yield * expiry).exp();
    let pdf_d1 = norm_pdf(d1);

    let gamma = df_q * pdf_d1 / (spot * vol * sqrt_t);
    let vega = spot * df_q * pdf_d1 * sqrt_t;
    let decay = -spot * df_q * pdf_d1 * vol / (2.0 * sqrt_t);

    match option_type {
        OptionType::Call => Greeks {
            delta: df_q * norm_cdf(d1),
            gamma,
            vega,
            theta: decay + dividend_yield * spot * df_q * norm_cdf(d1)
                - rate * strike * df_r * norm_cdf(d2),
            rho: strike * expiry * df_r * norm_cdf(d2),
        },
        OptionType::Put => Greeks {
            delta: df_q * (norm_cdf(d1) - 1.0),
            gamma,
            vega,
            theta: decay - dividend_yield * spot * df_q * norm_cdf(-d1)
                + rate * strike * df_r * norm_cdf(-d2),
            rho: -strike * expiry * df_r * norm_cdf(-d2),
        },
    }
}

/// Check that inputs describe a live option with a positive spot and strike.
pub fn validate_inputs(inputs: &OptionInputs) -> AnalyticsResult<()> {
    let checks = [
        ("spot", inputs.spot),
        ("strike", inputs.strike),
        ("vol", inputs.vol),
        ("expiry", inputs.expiry),
    ];
    for (name, value) in checks {
        if !value.is_finite() || value <= 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
    }
    if !inputs.rate.is_finite() || !inputs.dividend_yield.is_finite() {
        return Err(AnalyticsError::invalid_input("rates must be finite"));
    }
    Ok(())
}

/// Analytic Black-Scholes-Merton pricer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholes;

impl BlackScholes {
    /// Price after validating the inputs.
    pub fn try_price(&self, inputs: &OptionInputs) -> AnalyticsResult<f64> {
        validate_inputs(inputs)?;
        Ok(bs_price(inputs))
    }

    /// Greeks after validating the inputs.
    pub fn try_greeks(&self, inputs: &OptionInputs) -> AnalyticsResult<Greeks> {
        validate_inputs(inputs)?;
        Ok(bs_greeks(inputs))
    }
}

impl OptionPricer for BlackScholes {
    fn price(&self, inputs: &OptionInputs) -> f64 {
        bs_price(inputs)
    }

    fn greeks(&self, inputs: &OptionInputs) -> Greeks {
        bs_greeks(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn atm(option_type: OptionType) -> OptionInputs {
        OptionInputs {
            option_type,
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            dividend_yield: 0.0,
            vol: 0.2,
            expiry: 1.0,
        }
    }

    #[test]
    fn test_reference_prices() {
        // Hull, Options Futures and Other Derivatives, ATM 1y reference values
        assert_relative_eq!(bs_price(&atm(OptionType::Call)), 10.450_583_572_185_565, epsilon = 1e-9);
        assert_relative_eq!(bs_price(&atm(OptionType::Put)), 5.573_526_022_256_971, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_greeks() {
        let g = bs_greeks(&atm(OptionType::Call));
        assert_relative_eq!(g.delta, 0.636_830_651_175_619, epsilon = 1e-9);
        assert_relative_eq!(g.gamma, 0.018_762_017_345_846_9, epsilon = 1e-9);
        assert_relative_eq!(g.vega, 37.524_034_691_693_8, epsilon = 1e-7);
        assert_relative_eq!(g.rho, 53.232_481_545_376_3, epsilon = 1e-7);

        let p = bs_greeks(&atm(OptionType::Put));
        assert_relative_eq!(p.delta, g.delta - 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.vega, g.vega, epsilon = 1e-12);
    }

    #[test]
    fn test_expired_option_is_intrinsic() {
        let mut inputs = atm(OptionType::Call);
        inputs.spot = 110.0;
        inputs.expiry = 0.0;
        assert_relative_eq!(bs_price(&inputs), 10.0);
        assert_eq!(bs_greeks(&inputs), Greeks::default());
    }

    #[test]
    fn test_zero_vol_is_discounted_forward_payoff() {
        let mut inputs = atm(OptionType::Call);
        inputs.vol = 0.0;
        let expected = 100.0 - 100.0 * (-0.05_f64).exp();
        assert_relative_eq!(bs_price(&inputs), expected, epsilon = 1e-12);
        assert_eq!(bs_greeks(&inputs).delta, 0.0);
    }

    #[test]
    fn test_tiny_vol_floor_is_finite() {
        let mut inputs = atm(OptionType::Put);
        inputs.vol = 0.0001;
        let g = bs_greeks(&inputs);
        assert!(g.delta.is_finite());
        assert!(g.vega.is_finite());
        assert!(g.rho.is_finite());
        assert!(bs_price(&inputs).is_finite());
    }

    #[test]
    fn test_try_price_rejects_invalid() {
        let mut inputs = atm(OptionType::Call);
        inputs.strike = 0.0;
        assert!(BlackScholes.try_price(&inputs).is_err());
        assert!(BlackScholes.try_greeks(&atm(OptionType::Call)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_put_call_parity(
            spot in 10.0f64..500.0,
            strike in 10.0f64..500.0,
            rate in -0.02f64..0.2,
            q in 0.0f64..0.1,
            vol in 0.01f64..1.5,
            expiry in 0.01f64..5.0,
        ) {
            let call = OptionInputs { option_type: OptionType::Call, spot, strike, rate, dividend_yield: q, vol, expiry };
            let put = OptionInputs { option_type: OptionType::Put, ..call };
            let lhs = bs_price(&call) - bs_price(&put);
            let rhs = spot * (-q * expiry).exp() - strike * (-rate * expiry).exp();
            prop_assert!((lhs - rhs).abs() < 1e-8 * spot.max(strike));
        }

        #[test]
        fn prop_call_delta_in_unit_interval(
            spot in 10.0f64..500.0,
            vol in 0.01f64..1.5,
            expiry in 0.01f64..5.0,
        ) {
            let call = OptionInputs { option_type: OptionType::Call, spot, strike: 100.0, rate: 0.05, dividend_yield: 0.0, vol, expiry };
            let delta = bs_greeks(&call).delta;
            prop_assert!((0.0..=1.0).contains(&delta));
        }
    }
}
