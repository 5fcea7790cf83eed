//! Portfolio builder for fluent construction.

use stresslab_traits::AccountId;

use crate::types::{Position, PricingAssumptions};
use crate::{Portfolio, PortfolioError, PortfolioResult};

/// Currency used when neither the caller nor the positions provide one.
pub const DEFAULT_BASE_CURRENCY: &str = "RUB";

/// Builder for constructing a [`Portfolio`].
///
/// # Example
///
/// ```rust
/// use stresslab_portfolio::prelude::*;
///
/// let portfolio = PortfolioBuilder::new()
///     .account_id("2000123456")
///     .add_position(Position::linear(Figi::new("BBG004730N88"), None, 10.0, 100.0).with_currency("RUB"))
///     .build()
///     .unwrap();
/// assert_eq!(portfolio.base_currency, "RUB");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortfolioBuilder {
    account_id: Option<AccountId>,
    base_currency: Option<String>,
    fallback_currency: Option<String>,
    assumptions: PricingAssumptions,
    positions: Vec<Position>,
}

impl PortfolioBuilder {
    /// Creates a new portfolio builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account ID.
    #[must_use]
    pub fn account_id(mut self, id: impl Into<String>) -> Self {
        self.account_id = Some(AccountId::new(id));
        self
    }

    /// Sets the base currency explicitly.
    #[must_use]
    pub fn base_currency(mut self, currency: impl Into<String>) -> Self {
        self.base_currency = Some(currency.into());
        self
    }

    /// Sets the currency used when no base currency can be derived.
    #[must_use]
    pub fn fallback_currency(mut self, currency: impl Into<String>) -> Self {
        self.fallback_currency = Some(currency.into());
        self
    }

    /// Sets the option pricing defaults.
    #[must_use]
    pub fn assumptions(mut self, assumptions: PricingAssumptions) -> Self {
        self.assumptions = assumptions;
        self
    }

    /// Adds a position to the portfolio.
    #[must_use]
    pub fn add_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Adds multiple positions to the portfolio.
    #[must_use]
    pub fn add_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.positions.extend(positions);
        self
    }

    /// Builds the portfolio.
    ///
    /// The base currency is the explicit one if set, else the first
    /// position's currency, else the fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, a position has a
    /// non-finite quantity or price, or an assumption is not finite.
    pub fn build(self) -> PortfolioResult<Portfolio> {
        let account_id = self
            .account_id
            .ok_or_else(|| PortfolioError::missing_field("account_id"))?;

        validate_assumptions(&self.assumptions)?;
        for position in &self.positions {
            if !position.quantity.is_finite() {
                return Err(PortfolioError::invalid_position(
                    position.key.to_string(),
                    "quantity is not finite",
                ));
            }
            if !position.last_price.is_finite() {
                return Err(PortfolioError::invalid_position(
                    position.key.to_string(),
                    "last price is not finite",
                ));
            }
        }

        let base_currency = self
            .base_currency
            .or_else(|| {
                self.positions
                    .first()
                    .map(|p| p.currency.clone())
                    .filter(|c| !c.is_empty())
            })
            .or(self.fallback_currency)
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());

        Ok(Portfolio {
            account_id,
            base_currency,
            assumptions: self.assumptions,
            positions: self.positions,
        })
    }
}

fn validate_assumptions(a: &PricingAssumptions) -> PortfolioResult<()> {
    let checks = [
        ("default_vol", a.default_vol),
        ("default_rate", a.default_rate),
        ("default_dividend_yield", a.default_dividend_yield),
    ];
    for (name, value) in checks {
        if !value.is_finite() {
            return Err(PortfolioError::invalid_assumption(name, value));
        }
    }
    Ok(())
}
