//! # StressLab Analytics
//!
//! Closed-form analytics consumed by the stress engine:
//! - **Options**: Black-Scholes-Merton price and Greeks with continuous dividend yield
//! - **Risk**: Historical Value-at-Risk and Expected Shortfall
//!
//! Both are exposed as free functions returning [`AnalyticsResult`] and as
//! implementations of the `stresslab-traits` collaborator traits, so the engine
//! can be wired with mocks in tests.
//!
//! ## Usage
//!
//! ```rust
//! use stresslab_analytics::prelude::*;
//!
//! let inputs = OptionInputs {
//!     option_type: OptionType::Call,
//!     spot: 100.0,
//!     strike: 100.0,
//!     rate: 0.05,
//!     dividend_yield: 0.0,
//!     vol: 0.2,
//!     expiry: 1.0,
//! };
//! let price = BlackScholes.price(&inputs);
//! assert!((price - 10.4506).abs() < 1e-3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod options;
pub mod risk;

pub use error::{AnalyticsError, AnalyticsResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{AnalyticsError, AnalyticsResult};
    pub use crate::options::{bs_greeks, bs_price, BlackScholes};
    pub use crate::risk::{
        historical_expected_shortfall, historical_var, HistoricalRisk, TailRisk,
    };
    pub use stresslab_traits::analytics::{
        Greeks, OptionInputs, OptionPricer, OptionType, TailRiskEstimator,
    };
}
