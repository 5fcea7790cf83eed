//! Historical candle loading for the portfolio P&L series.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stresslab_portfolio::{
    aggregate_pnl, select_candidates, HistoryWindow, InstrumentCloses, Portfolio,
    PortfolioPnlSeries,
};
use stresslab_traits::market_data::CandleSource;
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::retry::{call_with_retry, LoadOptions};

/// Fetches daily candles for the largest positions and folds them into a
/// [`PortfolioPnlSeries`].
#[derive(Clone)]
pub struct HistoryLoader {
    candles: Arc<dyn CandleSource>,
}

impl HistoryLoader {
    /// Creates a loader over a candle source.
    pub fn new(candles: Arc<dyn CandleSource>) -> Self {
        Self { candles }
    }

    /// Build the historical P&L series of `portfolio` over the `window_days`
    /// calendar days ending at `as_of`, using at most `max_instruments`
    /// instruments.
    ///
    /// Candles are fetched one instrument at a time, largest exposure first.
    ///
    /// # Errors
    ///
    /// Any failed candle request fails the whole build.
    pub async fn build_history(
        &self,
        portfolio: &Portfolio,
        window_days: u32,
        max_instruments: usize,
        as_of: DateTime<Utc>,
        options: &LoadOptions,
    ) -> EngineResult<PortfolioPnlSeries> {
        let candidates = select_candidates(portfolio, max_instruments);
        let window = HistoryWindow::ending_at(as_of, window_days)?;
        info!(
            candidates = candidates.len(),
            window_days,
            from = %window.from,
            to = %window.to,
            "Loading candle history"
        );

        let source = &self.candles;
        let mut series = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let figi = &candidate.figi;
            let candles = call_with_retry("candles", options, move || {
                source.daily_candles(figi, window.from, window.to)
            })
            .await?;
            debug!(instrument_id = %figi, count = candles.len(), "Loaded candles");

            series.push(InstrumentCloses {
                closes: candles.iter().map(|c| c.close.to_f64()).collect(),
                figi: candidate.figi,
                quantity: candidate.quantity,
            });
        }

        let pnl = aggregate_pnl(&series);
        info!(
            days = pnl.len(),
            instruments_used = pnl.instruments_used,
            "Candle history aggregated"
        );
        Ok(pnl)
    }
}
