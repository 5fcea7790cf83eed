//! # StressLab Traits
//!
//! Trait definitions for the StressLab risk engine.
//!
//! This crate contains ONLY trait definitions and the plain data they exchange.
//! All implementations live in separate crates.
//!
//! ## Module Structure
//!
//! - [`ids`]: Typed identifiers (FIGI, position UID, account ID)
//! - [`money`]: Broker fixed-point quotations
//! - [`reference_data`]: Broker positions and the instrument directory
//! - [`market_data`]: Last prices and daily candles
//! - [`analytics`]: Analytic option pricer and historical tail-risk estimator
//!
//! ## Dependency Injection
//!
//! Loaders receive the providers as trait objects:
//!
//! ```ignore
//! PortfolioLoader::new(
//!     ReferenceDataProvider { positions, directory },
//!     MarketDataProvider { last_prices, candles },
//!     settings,
//! )
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod error;
pub mod ids;
pub mod market_data;
pub mod money;
pub mod reference_data;

// Re-export commonly used types
pub use analytics::{Greeks, OptionInputs, OptionPricer, OptionType, TailRiskEstimator};
pub use error::TraitError;
pub use ids::*;
pub use money::Quotation;
