//! File-based market data sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Deserialize;

use stresslab_traits::error::TraitError;
use stresslab_traits::market_data::*;
use stresslab_traits::{Figi, Quotation};

/// Parse a decimal price column into a quotation.
pub(crate) fn parse_price(raw: &str) -> Result<Quotation, TraitError> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|e| TraitError::ParseError(format!("price '{raw}': {e}")))?;
    Quotation::from_decimal(value)
        .ok_or_else(|| TraitError::ParseError(format!("price '{raw}' is out of range")))
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub(crate) fn parse_time(raw: &str) -> Result<DateTime<Utc>, TraitError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| TraitError::ParseError(format!("timestamp '{raw}': {e}")))
}

// =============================================================================
// CSV LAST PRICE SOURCE
// =============================================================================

/// CSV record for last prices: `figi,price`.
#[derive(Debug, Deserialize)]
struct LastPriceRecord {
    figi: String,
    price: String,
}

/// CSV-based last price source for EOD snapshots and tests.
pub struct CsvLastPriceSource {
    file_path: PathBuf,
    prices: DashMap<Figi, Quotation>,
}

impl CsvLastPriceSource {
    /// Create a new CSV last price source.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            prices: DashMap::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload prices from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            return Ok(()); // Empty source
        }

        let mut reader = csv::Reader::from_path(&self.file_path)
            .map_err(|e| TraitError::IoError(e.to_string()))?;

        // Parse everything before touching the live table.
        let mut loaded: HashMap<Figi, Quotation> = HashMap::new();
        for result in reader.deserialize() {
            let record: LastPriceRecord =
                result.map_err(|e| TraitError::ParseError(e.to_string()))?;
            let figi = Figi::new(record.figi.trim());
            if figi.is_blank() {
                continue;
            }
            loaded.insert(figi, parse_price(&record.price)?);
        }

        self.prices.retain(|figi, _| loaded.contains_key(figi));
        for (figi, price) in loaded {
            self.prices.insert(figi, price);
        }
        Ok(())
    }

    /// Number of priced instruments.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Returns true if the file had no prices.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl LastPriceSource for CsvLastPriceSource {
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

// =============================================================================
// CSV CANDLE SOURCE
// =============================================================================

/// CSV record for daily candles: `figi,date,close`.
#[derive(Debug, Deserialize)]
struct CandleRecord {
    figi: String,
    date: String,
    close: String,
}

/// CSV-based daily candle source.
///
/// Rows may appear in any order; each instrument's candles are kept sorted
/// by time.
pub struct CsvCandleSource {
    file_path: PathBuf,
    candles: DashMap<Figi, Vec<DailyCandle>>,
}

impl CsvCandleSource {
    /// Create a new CSV candle source.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            candles: DashMap::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload candles from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            return Ok(()); // Empty source
        }

        let mut reader = csv::Reader::from_path(&self.file_path)
            .map_err(|e| TraitError::IoError(e.to_string()))?;

        let mut loaded: HashMap<Figi, Vec<DailyCandle>> = HashMap::new();
        for result in reader.deserialize() {
            let record: CandleRecord = result.map_err(|e| TraitError::ParseError(e.to_string()))?;
            let candle = DailyCandle {
                time: parse_time(&record.date)?,
                close: parse_price(&record.close)?,
            };
            loaded
                .entry(Figi::new(record.figi.trim()))
                .or_default()
                .push(candle);
        }

        self.candles.retain(|figi, _| loaded.contains_key(figi));
        for (figi, mut series) in loaded {
            series.sort_by_key(|c| c.time);
            self.candles.insert(figi, series);
        }
        Ok(())
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
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
