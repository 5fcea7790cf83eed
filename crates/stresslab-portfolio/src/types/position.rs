//! Normalized position records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stresslab_traits::analytics::OptionType;
use stresslab_traits::reference_data::InstrumentClass;
use stresslab_traits::{Figi, InstrumentKey, PositionUid};

/// Day count used to turn calendar time into years.
pub const DAYS_PER_YEAR: f64 = 365.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Portfolio-wide pricing defaults for options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingAssumptions {
    /// Implied volatility used for every option.
    pub default_vol: f64,
    /// Continuously compounded risk-free rate.
    pub default_rate: f64,
    /// Continuous dividend yield.
    pub default_dividend_yield: f64,
}

impl Default for PricingAssumptions {
    fn default() -> Self {
        Self {
            default_vol: 0.50,
            default_rate: 0.10,
            default_dividend_yield: 0.0,
        }
    }
}

/// Why an option could not be linked to a priced underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnlinkedReason {
    /// The contract does not name an underlying.
    NoUnderlying,
    /// The underlying position UID is not in the instrument directory.
    UnknownUnderlying {
        /// Underlying position UID from the contract
        position_uid: PositionUid,
    },
    /// The underlying is known but has no positive last price.
    NoLastPrice {
        /// Underlying position UID from the contract
        position_uid: PositionUid,
        /// Resolved underlying FIGI
        figi: Figi,
    },
}

/// Result of joining an option to its underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnderlyingLink {
    /// Underlying resolved and priced.
    Linked {
        /// Underlying position UID
        position_uid: PositionUid,
        /// Underlying FIGI
        figi: Figi,
        /// Underlying last price, always positive
        spot: f64,
    },
    /// Underlying could not be resolved.
    Unlinked(UnlinkedReason),
}

impl UnderlyingLink {
    /// Spot of the underlying, zero when unlinked.
    #[must_use]
    pub fn spot(&self) -> f64 {
        match self {
            UnderlyingLink::Linked { spot, .. } => *spot,
            UnderlyingLink::Unlinked(_) => 0.0,
        }
    }

    /// FIGI of the underlying when resolved.
    #[must_use]
    pub fn figi(&self) -> Option<&Figi> {
        match self {
            UnderlyingLink::Linked { figi, .. } => Some(figi),
            UnderlyingLink::Unlinked(UnlinkedReason::NoLastPrice { figi, .. }) => Some(figi),
            UnderlyingLink::Unlinked(_) => None,
        }
    }

    /// Returns true if the underlying is resolved and priced.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        matches!(self, UnderlyingLink::Linked { .. })
    }
}

/// Contract terms of an option position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTerms {
    /// Link to the underlying instrument.
    pub underlying: UnderlyingLink,
    /// Strike price, zero when unknown.
    pub strike: f64,
    /// Expiration time, `None` when unknown.
    pub expiration: Option<DateTime<Utc>>,
    /// Call or put.
    pub option_type: OptionType,
    /// Units of underlying per contract, always positive.
    pub contract_size: f64,
}

impl OptionTerms {
    /// Create option terms. A missing, non-finite or non-positive contract
    /// size becomes 1.
    #[must_use]
    pub fn new(
        underlying: UnderlyingLink,
        strike: f64,
        expiration: Option<DateTime<Utc>>,
        option_type: OptionType,
        contract_size: f64,
    ) -> Self {
        let contract_size = if contract_size.is_finite() && contract_size > 0.0 {
            contract_size
        } else {
            1.0
        };
        Self {
            underlying,
            strike,
            expiration,
            option_type,
            contract_size,
        }
    }

    /// Remaining life in years at `now`; zero once expired or when unknown.
    #[must_use]
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> f64 {
        match self.expiration {
            Some(expiration) if expiration > now => {
                (expiration - now).num_milliseconds() as f64 / MILLIS_PER_DAY / DAYS_PER_YEAR
            }
            _ => 0.0,
        }
    }
}

/// What kind of instrument a position holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Share, ETF, bond or future. The class is `None` when the directory
    /// did not list the instrument.
    Linear {
        /// Directory listing
        class: Option<InstrumentClass>,
    },
    /// Option contract.
    Option(OptionTerms),
}

/// A normalized portfolio position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// FIGI for linear instruments, position UID for options.
    pub key: InstrumentKey,
    /// Exchange ticker, empty when unknown.
    pub ticker: String,
    /// Display name, empty when unknown.
    pub name: String,
    /// Trading currency code.
    pub currency: String,
    /// Signed quantity; negative is short.
    pub quantity: f64,
    /// Last traded price, zero when unknown.
    pub last_price: f64,
    /// `last_price * quantity` for linear instruments, zero for options.
    pub market_value: f64,
    /// Instrument kind.
    pub kind: InstrumentKind,
}

impl Position {
    /// Create a linear position; market value is derived from price and quantity.
    #[must_use]
    pub fn linear(
        figi: Figi,
        class: Option<InstrumentClass>,
        quantity: f64,
        last_price: f64,
    ) -> Self {
        Self {
            key: InstrumentKey::Figi(figi),
            ticker: String::new(),
            name: String::new(),
            currency: String::new(),
            quantity,
            last_price,
            market_value: last_price * quantity,
            kind: InstrumentKind::Linear { class },
        }
    }

    /// Create an option position. Options carry no last price of their own.
    #[must_use]
    pub fn option(position_uid: PositionUid, quantity: f64, terms: OptionTerms) -> Self {
        Self {
            key: InstrumentKey::PositionUid(position_uid),
            ticker: String::new(),
            name: String::new(),
            currency: String::new(),
            quantity,
            last_price: 0.0,
            market_value: 0.0,
            kind: InstrumentKind::Option(terms),
        }
    }

    /// Sets ticker and name.
    #[must_use]
    pub fn with_labels(mut self, ticker: impl Into<String>, name: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self.name = name.into();
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Returns true for option positions.
    #[must_use]
    pub fn is_option(&self) -> bool {
        matches!(self.kind, InstrumentKind::Option(_))
    }

    /// Option terms, if this is an option.
    #[must_use]
    pub fn option_terms(&self) -> Option<&OptionTerms> {
        match &self.kind {
            InstrumentKind::Option(terms) => Some(terms),
            InstrumentKind::Linear { .. } => None,
        }
    }

    /// FIGI of a linear position.
    #[must_use]
    pub fn figi(&self) -> Option<&Figi> {
        self.key.figi()
    }

    /// Instrument type tag: "option" for options, the listing tag otherwise,
    /// empty for unlisted instruments.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match &self.kind {
            InstrumentKind::Option(_) => "option",
            InstrumentKind::Linear { class: Some(class) } => class.as_str(),
            InstrumentKind::Linear { class: None } => "",
        }
    }
}
