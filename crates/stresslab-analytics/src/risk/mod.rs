//! Historical tail-risk measures.

mod historical;

pub use historical::{historical_expected_shortfall, historical_var, HistoricalRisk, TailRisk};
