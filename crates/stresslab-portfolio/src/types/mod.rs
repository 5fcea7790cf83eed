//! Core types: positions, pricing assumptions and engine configuration.

mod config;
mod position;

pub use config::StressConfig;
pub use position::{
    InstrumentKind, OptionTerms, Position, PricingAssumptions, UnderlyingLink, UnlinkedReason,
    DAYS_PER_YEAR,
};
