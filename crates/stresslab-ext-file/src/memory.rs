//! In-memory sources, populated in code.
//!
//! Useful for demos and for driving the loaders in tests without touching
//! the filesystem.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use stresslab_traits::error::TraitError;
use stresslab_traits::market_data::*;
use stresslab_traits::reference_data::*;
use stresslab_traits::{AccountId, Figi, Quotation};

/// Broker snapshot held in memory.
#[derive(Default)]
pub struct InMemoryBroker {
    accounts: RwLock<Vec<BrokerAccount>>,
    positions: DashMap<AccountId, BrokerPositions>,
}

impl InMemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account with its balances.
    #[must_use]
    pub fn with_account(self, id: impl Into<AccountId>, positions: BrokerPositions) -> Self {
        self.insert_account(id, positions);
        self
    }

    /// Adds or replaces an account.
    pub fn insert_account(&self, id: impl Into<AccountId>, positions: BrokerPositions) {
        let id = id.into();
        {
            let mut accounts = self.accounts.write();
            if !accounts.iter().any(|a| a.id == id) {
                accounts.push(BrokerAccount {
                    id: id.clone(),
                    name: String::new(),
                });
            }
        }
        self.positions.insert(id, positions);
    }
}

#[async_trait]
impl PositionSource for InMemoryBroker {
    async fn accounts(&self) -> Result<Vec<BrokerAccount>, TraitError> {
        Ok(self.accounts.read().clone())
    }

    async fn positions(&self, account_id: &AccountId) -> Result<BrokerPositions, TraitError> {
        self.positions
            .get(account_id)
            .map(|p| p.clone())
            .ok_or_else(|| TraitError::NotFound(format!("account {account_id}")))
    }
}

/// Instrument directory held in memory.
#[derive(Default)]
pub struct InMemoryDirectory {
    listings: RwLock<HashMap<InstrumentClass, Vec<InstrumentInfo>>>,
    options: RwLock<Vec<OptionContract>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instrument to a listing.
    #[must_use]
    pub fn with_instrument(self, class: InstrumentClass, info: InstrumentInfo) -> Self {
        self.listings.write().entry(class).or_default().push(info);
        self
    }

    /// Appends an option contract.
    #[must_use]
    pub fn with_option(self, contract: OptionContract) -> Self {
        self.options.write().push(contract);
        self
    }
}

#[async_trait]
impl InstrumentDirectory for InMemoryDirectory {
    async fn instruments(
        &self,
        class: InstrumentClass,
    ) -> Result<Vec<InstrumentInfo>, TraitError> {
        Ok(self.listings.read().get(&class).cloned().unwrap_or_default())
    }

    async fn options(&self) -> Result<Vec<OptionContract>, TraitError> {
        Ok(self.options.read().clone())
    }
}

/// Last prices and daily candles held in memory.
#[derive(Default)]
pub struct InMemoryMarketData {
    prices: DashMap<Figi, Quotation>,
    candles: DashMap<Figi, Vec<DailyCandle>>,
}

impl InMemoryMarketData {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the last price of an instrument.
    #[must_use]
    pub fn with_price(self, figi: impl Into<Figi>, price: f64) -> Self {
        self.set_price(figi, price);
        self
    }

    /// Sets the daily candles of an instrument; they are sorted by time.
    #[must_use]
    pub fn with_candles(self, figi: impl Into<Figi>, mut candles: Vec<DailyCandle>) -> Self {
        candles.sort_by_key(|c| c.time);
        self.candles.insert(figi.into(), candles);
        self
    }

    /// Sets the last price of an instrument.
    pub fn set_price(&self, figi: impl Into<Figi>, price: f64) {
        self.prices.insert(figi.into(), quotation_from_f64(price));
    }
}

fn quotation_from_f64(value: f64) -> Quotation {
    let units = value.trunc();
    let nano = ((value - units) * 1e9).round();
    Quotation::new(units as i64, nano as i32)
}

#[async_trait]
impl LastPriceSource for InMemoryMarketData {
    async fn last_prices(&self, figis: &[Figi]) -> Result<Vec<LastPrice>, TraitError> {
        Ok(figis
            .iter()
            .filter_map(|figi| {
                self.prices.get(figi).map(|p| LastPrice {
                    figi: figi.clone(),
                    price: *p,
                })
            })
            .collect())
    }
}

#[async_trait]
impl CandleSource for InMemoryMarketData {
    async fn daily_candles(
        &self,
        figi: &Figi,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyCandle>, TraitError> {
        Ok(self
            .candles
            .get(figi)
            .map(|series| {
                series
                    .iter()
                    .filter(|c| c.time >= from && c.time <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
