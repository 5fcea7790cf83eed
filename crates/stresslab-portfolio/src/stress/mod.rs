//! Stress scenarios.
//!
//! A scenario shocks the equity index, implied volatility and rates, and
//! amplifies losses with a scalar correlation-crisis level. Linear positions
//! move with the index; options use a first-order Greeks expansion at the
//! shocked spot. Tail risk comes from the historical P&L series, when loaded.

mod engine;
mod inputs;
mod result;

pub use engine::{
    StressEngine, MIN_TAIL_RISK_POINTS, POSITION_CRISIS_WEIGHT, TAIL_CONFIDENCE,
    TAIL_CRISIS_WEIGHT,
};
pub use inputs::{StressScenarioInputs, VOL_FLOOR};
pub use result::{PositionGreeks, PositionOutcome, PositionRiskResult, StressResult};
