//! Portfolio struct and core methods.

use serde::{Deserialize, Serialize};
use stresslab_traits::AccountId;

use crate::types::{Position, PricingAssumptions};

/// A normalized brokerage portfolio.
///
/// Immutable once built; a reload produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Account the positions belong to.
    pub account_id: AccountId,

    /// Reporting currency.
    pub base_currency: String,

    /// Option pricing defaults.
    pub assumptions: PricingAssumptions,

    /// Positions: securities, then futures, then options.
    pub positions: Vec<Position>,
}

impl Portfolio {
    /// Creates a new portfolio builder.
    #[must_use]
    pub fn builder(account_id: impl Into<String>) -> super::PortfolioBuilder {
        super::PortfolioBuilder::new().account_id(account_id)
    }

    /// Returns the number of positions.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the portfolio has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of linear market values. Options are excluded.
    #[must_use]
    pub fn linear_market_value(&self) -> f64 {
        self.positions
            .iter()
            .filter(|p| !p.is_option())
            .map(|p| p.market_value)
            .sum()
    }

    /// Iterates over option positions.
    pub fn options(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_option())
    }
}
