//! Reference data source traits.
//!
//! These traits define interfaces for the broker side of a portfolio load:
//! - [`PositionSource`]: accounts and raw position balances
//! - [`InstrumentDirectory`]: instrument listings and option contract terms

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::ids::*;
use crate::money::Quotation;

// =============================================================================
// POSITIONS
// =============================================================================

/// Brokerage account as listed by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerAccount {
    /// Account identifier
    pub id: AccountId,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Balance of a share, ETF or bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityBalance {
    /// Instrument FIGI (may be blank in broker payloads)
    #[serde(default = "blank_figi")]
    pub figi: Figi,
    /// Signed balance, negative for short positions
    pub balance: f64,
}

/// Balance of a futures contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutureBalance {
    /// Contract FIGI (may be blank in broker payloads)
    #[serde(default = "blank_figi")]
    pub figi: Figi,
    /// Signed number of contracts
    pub balance: f64,
}

/// Balance of an option contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionBalance {
    /// Option position UID (may be blank in broker payloads)
    #[serde(default)]
    pub position_uid: PositionUid,
    /// Signed number of contracts
    pub balance: f64,
}

/// Raw balances of one account, in broker order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerPositions {
    /// Shares, ETFs and bonds
    #[serde(default)]
    pub securities: Vec<SecurityBalance>,
    /// Futures
    #[serde(default)]
    pub futures: Vec<FutureBalance>,
    /// Options
    #[serde(default)]
    pub options: Vec<OptionBalance>,
}

fn blank_figi() -> Figi {
    Figi::new("")
}

/// Trait for broker position providers.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// List the accounts visible to the current credentials.
    async fn accounts(&self) -> Result<Vec<BrokerAccount>, TraitError>;

    /// Get raw balances for an account.
    async fn positions(&self, account_id: &AccountId) -> Result<BrokerPositions, TraitError>;
}

// =============================================================================
// INSTRUMENT DIRECTORY
// =============================================================================

/// Listing that a priced instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    /// Ordinary shares
    Share,
    /// Exchange-traded funds
    Etf,
    /// Bonds
    Bond,
    /// Futures contracts
    Future,
}

impl InstrumentClass {
    /// All linear listings, in directory load order.
    pub const ALL: [InstrumentClass; 4] = [
        InstrumentClass::Share,
        InstrumentClass::Etf,
        InstrumentClass::Bond,
        InstrumentClass::Future,
    ];

    /// Type tag carried on normalized positions.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentClass::Share => "share",
            InstrumentClass::Etf => "etf",
            InstrumentClass::Bond => "bond",
            InstrumentClass::Future => "future",
        }
    }
}

impl std::fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory entry for a share, ETF, bond or future.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    /// Instrument FIGI
    pub figi: Figi,
    /// Exchange ticker
    #[serde(default)]
    pub ticker: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Trading currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// Position UID, used to resolve option underlyings
    #[serde(default)]
    pub position_uid: PositionUid,
}

/// Option direction as listed by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionDirection {
    /// Right to buy
    Call,
    /// Right to sell
    Put,
    /// Direction not reported
    #[default]
    Unspecified,
}

/// Directory entry for an option contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    /// Option position UID
    pub position_uid: PositionUid,
    /// Exchange ticker
    #[serde(default)]
    pub ticker: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Settlement currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// Position UID of the underlying instrument
    #[serde(default)]
    pub basic_asset_position_uid: PositionUid,
    /// Strike price
    #[serde(default)]
    pub strike_price: Option<Quotation>,
    /// Expiration timestamp
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    /// Call or put
    #[serde(default)]
    pub direction: OptionDirection,
    /// Units of underlying per contract
    #[serde(default)]
    pub basic_asset_size: Option<Quotation>,
}

/// Trait for instrument directory providers.
#[async_trait]
pub trait InstrumentDirectory: Send + Sync {
    /// List all instruments of a linear class.
    async fn instruments(&self, class: InstrumentClass)
        -> Result<Vec<InstrumentInfo>, TraitError>;

    /// List all option contracts.
    async fn options(&self) -> Result<Vec<OptionContract>, TraitError>;
}

// =============================================================================
// COMPOSITE REFERENCE DATA PROVIDER
// =============================================================================

/// Combined reference data provider.
#[derive(Clone)]
pub struct ReferenceDataProvider {
    /// Account and position source
    pub positions: Arc<dyn PositionSource>,
    /// Instrument directory
    pub directory: Arc<dyn InstrumentDirectory>,
}
