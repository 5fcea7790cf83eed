//! # StressLab Portfolio
//!
//! The pure core of the StressLab risk engine.
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: no I/O, no clock reads; valuation time is an argument
//! - **Degrade, don't fail**: missing option metadata or short price history
//!   zeroes a contribution instead of raising an error
//! - **Typed joins**: options link to underlyings through an explicit
//!   [`UnderlyingLink`] rather than a sentinel spot value
//! - **Config-driven parallelism**: optional rayon support with threshold-based switching
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use stresslab_portfolio::prelude::*;
//!
//! let portfolio = Portfolio::builder("2000123456")
//!     .add_position(Position::linear(Figi::new("BBG004730N88"), None, 10.0, 100.0))
//!     .build()
//!     .unwrap();
//!
//! let inputs = StressScenarioInputs::new(-0.10, 0.0, 0.0, 0.0, portfolio.assumptions);
//! let result = StressEngine::default().calculate(&portfolio, &inputs, None, Utc::now());
//! assert!((result.total_stress_pnl + 100.0).abs() < 1e-9);
//! assert!(result.var99.is_none());
//! ```
//!
//! ## Module Overview
//!
//! - [`types`] - Positions, pricing assumptions, engine config
//! - [`portfolio`] - Portfolio and builder
//! - [`normalizer`] - Broker snapshot to portfolio
//! - [`history`] - Historical P&L candidate selection and aggregation
//! - [`stress`] - Scenario inputs, engine and results
//!
//! ## Feature Flags
//!
//! - `parallel`: Enable rayon-based parallel evaluation for large books

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod history;
pub mod normalizer;
pub mod parallel;
pub mod portfolio;
pub mod stress;
pub mod types;

pub use error::{PortfolioError, PortfolioResult};
pub use history::{
    aggregate_pnl, select_candidates, HistoryCandidate, HistoryWindow, InstrumentCloses,
    PortfolioPnlSeries,
};
pub use normalizer::{price_request, InstrumentIndex, LastPriceTable, SnapshotNormalizer};
pub use parallel::maybe_parallel_map;
pub use portfolio::{Portfolio, PortfolioBuilder, DEFAULT_BASE_CURRENCY};
pub use stress::{
    PositionGreeks, PositionOutcome, PositionRiskResult, StressEngine, StressResult,
    StressScenarioInputs,
};
pub use types::{
    InstrumentKind, OptionTerms, Position, PricingAssumptions, StressConfig, UnderlyingLink,
    UnlinkedReason,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{PortfolioError, PortfolioResult};
    pub use crate::history::{
        aggregate_pnl, select_candidates, HistoryCandidate, HistoryWindow, InstrumentCloses,
        PortfolioPnlSeries,
    };
    pub use crate::normalizer::{
        price_request, InstrumentIndex, LastPriceTable, SnapshotNormalizer,
    };
    pub use crate::portfolio::{Portfolio, PortfolioBuilder};
    pub use crate::stress::{
        PositionGreeks, PositionOutcome, PositionRiskResult, StressEngine, StressResult,
        StressScenarioInputs,
    };
    pub use crate::types::{
        InstrumentKind, OptionTerms, Position, PricingAssumptions, StressConfig, UnderlyingLink,
        UnlinkedReason,
    };
    pub use stresslab_traits::analytics::{Greeks, OptionInputs, OptionPricer, OptionType, TailRiskEstimator};
    pub use stresslab_traits::{AccountId, Figi, InstrumentKey, PositionUid};
}
