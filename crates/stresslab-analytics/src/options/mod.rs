//! Analytic option models.

mod black_scholes;

pub use black_scholes::{bs_greeks, bs_price, norm_cdf, norm_pdf, validate_inputs, BlackScholes};
