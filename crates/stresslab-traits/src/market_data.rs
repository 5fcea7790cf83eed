//! Market data source traits.
//!
//! - [`LastPriceSource`]: last traded prices
//! - [`CandleSource`]: daily candles for historical windows

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::ids::Figi;
use crate::money::Quotation;

// =============================================================================
// LAST PRICES
// =============================================================================

/// Last traded price of an instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPrice {
    /// Instrument FIGI
    pub figi: Figi,
    /// Last traded price
    pub price: Quotation,
}

/// Trait for last price providers.
#[async_trait]
pub trait LastPriceSource: Send + Sync {
    /// Get last prices for the requested instruments.
    ///
    /// Instruments without a price are omitted from the result.
    async fn last_prices(&self, figis: &[Figi]) -> Result<Vec<LastPrice>, TraitError>;
}

// =============================================================================
// CANDLES
// =============================================================================

/// One daily candle. Only the close is used by the risk engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCandle {
    /// Candle open time (UTC)
    pub time: DateTime<Utc>,
    /// Close price
    pub close: Quotation,
}

/// Trait for historical candle providers.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Get daily candles for `[from, to]`, ordered oldest first.
    async fn daily_candles(
        &self,
        figi: &Figi,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyCandle>, TraitError>;
}

// =============================================================================
// COMPOSITE MARKET DATA PROVIDER
// =============================================================================

/// Combined market data provider.
#[derive(Clone)]
pub struct MarketDataProvider {
    /// Last price source
    pub last_prices: Arc<dyn LastPriceSource>,
    /// Daily candle source
    pub candles: Arc<dyn CandleSource>,
}
