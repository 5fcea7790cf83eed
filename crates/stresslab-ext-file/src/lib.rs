//! # StressLab Ext File
//!
//! File-based broker, directory and market data sources for StressLab.
//!
//! This crate provides default implementations for offline runs and tests:
//! - JSON-based broker snapshot (accounts and balances)
//! - JSON-based instrument directory (listings and option contracts)
//! - CSV-based last prices and daily candles
//! - In-memory sources populated in code
//!
//! A live broker connection is a separate extension implementing the same
//! traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod market_data;
mod memory;
mod reference_data;

pub use market_data::*;
pub use memory::*;
pub use reference_data::*;

use std::path::Path;
use std::sync::Arc;

use stresslab_traits::error::TraitError;
use stresslab_traits::market_data::MarketDataProvider;
use stresslab_traits::reference_data::ReferenceDataProvider;

/// Broker snapshot file name inside a data directory.
pub const BROKER_FILE: &str = "broker.json";
/// Instrument directory file name inside a data directory.
pub const DIRECTORY_FILE: &str = "directory.json";
/// Last price file name inside a data directory.
pub const LAST_PRICES_FILE: &str = "last_prices.csv";
/// Daily candle file name inside a data directory.
pub const CANDLES_FILE: &str = "candles.csv";

/// Create a file-based reference data provider.
pub fn create_file_reference_data(
    broker_json: impl AsRef<Path>,
    directory_json: impl AsRef<Path>,
) -> Result<ReferenceDataProvider, TraitError> {
    Ok(ReferenceDataProvider {
        positions: Arc::new(JsonBrokerSource::new(broker_json)?),
        directory: Arc::new(JsonInstrumentDirectory::new(directory_json)?),
    })
}

/// Create a file-based market data provider.
pub fn create_file_market_data(
    last_prices_csv: impl AsRef<Path>,
    candles_csv: impl AsRef<Path>,
) -> Result<MarketDataProvider, TraitError> {
    Ok(MarketDataProvider {
        last_prices: Arc::new(CsvLastPriceSource::new(last_prices_csv)?),
        candles: Arc::new(CsvCandleSource::new(candles_csv)?),
    })
}

/// Create both providers from a directory holding [`BROKER_FILE`],
/// [`DIRECTORY_FILE`], [`LAST_PRICES_FILE`] and [`CANDLES_FILE`].
///
/// Missing files yield empty sources.
pub fn create_from_data_dir(
    dir: impl AsRef<Path>,
) -> Result<(ReferenceDataProvider, MarketDataProvider), TraitError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(TraitError::SourceNotAvailable(format!(
            "data directory {} does not exist",
            dir.display()
        )));
    }
    let reference = create_file_reference_data(dir.join(BROKER_FILE), dir.join(DIRECTORY_FILE))?;
    let market = create_file_market_data(dir.join(LAST_PRICES_FILE), dir.join(CANDLES_FILE))?;
    Ok((reference, market))
}

/// Create providers backed by in-memory sources.
pub fn create_memory_providers(
    broker: InMemoryBroker,
    directory: InMemoryDirectory,
    market: InMemoryMarketData,
) -> (ReferenceDataProvider, MarketDataProvider) {
    let market = Arc::new(market);
    (
        ReferenceDataProvider {
            positions: Arc::new(broker),
            directory: Arc::new(directory),
        },
        MarketDataProvider {
            last_prices: market.clone(),
            candles: market,
        },
    )
}
