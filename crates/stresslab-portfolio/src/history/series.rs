//! Candidate selection and P&L aggregation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use stresslab_traits::Figi;

use crate::error::{PortfolioError, PortfolioResult};
use crate::Portfolio;

/// Instruments with fewer closes than this are excluded.
pub const MIN_HISTORY_POINTS: usize = 20;

/// Shortest common overlap that still yields one day of P&L.
pub const MIN_OVERLAP_POINTS: usize = 2;

/// An instrument chosen for the historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryCandidate {
    /// Instrument FIGI
    pub figi: Figi,
    /// Current held quantity
    pub quantity: f64,
    /// Current market value, used for ranking
    pub market_value: f64,
}

/// Daily closes of one instrument, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentCloses {
    /// Instrument FIGI
    pub figi: Figi,
    /// Current held quantity
    pub quantity: f64,
    /// Close prices, most recent last
    pub closes: Vec<f64>,
}

/// Daily portfolio P&L, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPnlSeries {
    /// Daily P&L values
    pub pnl: Vec<f64>,
    /// Instruments that passed the history-length filter
    pub instruments_used: usize,
}

impl PortfolioPnlSeries {
    /// An empty series with a survivor count.
    #[must_use]
    pub fn empty(instruments_used: usize) -> Self {
        Self {
            pnl: Vec::new(),
            instruments_used,
        }
    }

    /// Number of daily observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pnl.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pnl.is_empty()
    }
}

/// Candle request window `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    /// Window start (UTC)
    pub from: DateTime<Utc>,
    /// Window end (UTC)
    pub to: DateTime<Utc>,
}

impl HistoryWindow {
    /// The `days` calendar days ending at `to`.
    ///
    /// # Errors
    ///
    /// [`PortfolioError::InvalidWindow`] when the start falls outside the
    /// representable date range.
    pub fn ending_at(to: DateTime<Utc>, days: u32) -> PortfolioResult<Self> {
        let from = Duration::try_days(i64::from(days))
            .and_then(|span| to.checked_sub_signed(span))
            .ok_or_else(|| PortfolioError::InvalidWindow {
                days,
                to: to.to_rfc3339(),
            })?;
        Ok(Self { from, to })
    }
}

/// Choose the instruments whose history drives the series.
///
/// Linear positions with a positive last price and non-zero quantity,
/// ranked by descending absolute market value, capped at `max_instruments`.
/// Ties keep portfolio order. A FIGI held in more than one position appears
/// once, with the quantities summed.
#[must_use]
pub fn select_candidates(portfolio: &Portfolio, max_instruments: usize) -> Vec<HistoryCandidate> {
    let mut ranked: Vec<HistoryCandidate> = portfolio
        .positions
        .iter()
        .filter(|p| p.last_price > 0.0 && p.quantity != 0.0)
        .filter_map(|p| {
            p.figi().map(|figi| HistoryCandidate {
                figi: figi.clone(),
                quantity: p.quantity,
                market_value: p.market_value,
            })
        })
        .collect();

    // Stable sort keeps portfolio order among equal magnitudes
    ranked.sort_by(|a, b| b.market_value.abs().total_cmp(&a.market_value.abs()));
    ranked.truncate(max_instruments);

    let mut merged: Vec<HistoryCandidate> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        match merged.iter_mut().find(|c| c.figi == candidate.figi) {
            Some(existing) => {
                existing.quantity += candidate.quantity;
                existing.market_value += candidate.market_value;
            }
            None => merged.push(candidate),
        }
    }
    merged
}

/// Fold instrument closes into a portfolio P&L series.
///
/// Series shorter than [`MIN_HISTORY_POINTS`] are dropped. The survivors are
/// right-aligned on the most recent close and cut to the shortest length
/// `min_len`, giving `min_len - 1` daily values:
///
/// ```text
/// pnl[t-1] = sum_i (close_i[t] - close_i[t-1]) * quantity_i
/// ```
///
/// No survivors gives an empty series with a count of 0; an overlap shorter
/// than [`MIN_OVERLAP_POINTS`] gives an empty series with the survivor count.
#[must_use]
pub fn aggregate_pnl(series: &[InstrumentCloses]) -> PortfolioPnlSeries {
    let survivors: Vec<&InstrumentCloses> = series
        .iter()
        .filter(|s| s.closes.len() >= MIN_HISTORY_POINTS)
        .collect();

    let used = survivors.len();
    let Some(min_len) = survivors.iter().map(|s| s.closes.len()).min() else {
        return PortfolioPnlSeries::empty(0);
    };
    if min_len < MIN_OVERLAP_POINTS {
        return PortfolioPnlSeries::empty(used);
    }

    let mut pnl = vec![0.0; min_len - 1];
    for instrument in &survivors {
        let aligned = &instrument.closes[instrument.closes.len() - min_len..];
        for (day, pair) in pnl.iter_mut().zip(aligned.windows(2)) {
            *day += (pair[1] - pair[0]) * instrument.quantity;
        }
    }

    PortfolioPnlSeries {
        pnl,
        instruments_used: used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionTerms, Position, UnderlyingLink, UnlinkedReason};
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use stresslab_traits::analytics::OptionType;
    use stresslab_traits::PositionUid;

    fn linear(figi: &str, qty: f64, price: f64) -> Position {
        Position::linear(Figi::new(figi), None, qty, price)
    }

    fn closes(figi: &str, qty: f64, values: Vec<f64>) -> InstrumentCloses {
        InstrumentCloses {
            figi: Figi::new(figi),
            quantity: qty,
            closes: values,
        }
    }

    fn ramp(n: usize, start: f64, step: f64) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn test_select_filters_and_ranks() {
        let option = Position::option(
            PositionUid::new("opt"),
            1.0,
            OptionTerms::new(
                UnderlyingLink::Unlinked(UnlinkedReason::NoUnderlying),
                1.0,
                None,
                OptionType::Call,
                1.0,
            ),
        );
        let portfolio = Portfolio::builder("acc")
            .add_positions([
                linear("SMALL", 1.0, 10.0),
                linear("ZEROQ", 0.0, 10.0),
                linear("NOPRICE", 100.0, 0.0),
                linear("SHORT", -50.0, 100.0),
                linear("BIG", 10.0, 400.0),
                option,
            ])
            .build()
            .unwrap();

        let figis: Vec<String> = select_candidates(&portfolio, 10)
            .into_iter()
            .map(|c| c.figi.to_string())
            .collect();
        assert_eq!(figis, vec!["SHORT", "BIG", "SMALL"]);

        let capped = select_candidates(&portfolio, 1);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].figi.as_str(), "SHORT");
    }

    #[test]
    fn test_select_ties_keep_portfolio_order() {
        let portfolio = Portfolio::builder("acc")
            .add_positions([
                linear("A", 10.0, 10.0),
                linear("B", -10.0, 10.0),
                linear("C", 5.0, 20.0),
            ])
            .build()
            .unwrap();
        let figis: Vec<String> = select_candidates(&portfolio, 2)
            .into_iter()
            .map(|c| c.figi.to_string())
            .collect();
        assert_eq!(figis, vec!["A", "B"]);
    }

    #[test]
    fn test_select_merges_duplicate_figi() {
        let portfolio = Portfolio::builder("acc")
            .add_positions([linear("A", 10.0, 10.0), linear("A", 5.0, 10.0)])
            .build()
            .unwrap();
        let candidates = select_candidates(&portfolio, 10);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quantity, 15.0);
    }

    #[test]
    fn test_aggregate_no_survivors() {
        let result = aggregate_pnl(&[closes("A", 1.0, ramp(19, 100.0, 1.0))]);
        assert_eq!(result, PortfolioPnlSeries::empty(0));
        assert_eq!(aggregate_pnl(&[]), PortfolioPnlSeries::empty(0));
    }

    #[test]
    fn test_aggregate_length_is_min_len_minus_one() {
        let result = aggregate_pnl(&[
            closes("A", 2.0, ramp(30, 100.0, 1.0)),
            closes("B", -1.0, ramp(25, 50.0, 0.5)),
            closes("SHORT", 100.0, ramp(5, 1.0, 1.0)),
        ]);
        assert_eq!(result.instruments_used, 2);
        assert_eq!(result.len(), 24);
        for day in &result.pnl {
            assert_relative_eq!(*day, 2.0 * 1.0 - 1.0 * 0.5);
        }
    }

    #[test]
    fn test_aggregate_right_aligns_on_latest_day() {
        // A has five extra old days with huge moves that must be ignored
        let mut a = vec![0.0, 1000.0, 0.0, 1000.0, 0.0];
        a.extend(ramp(20, 10.0, 1.0));
        let b = ramp(20, 100.0, 2.0);
        let result = aggregate_pnl(&[closes("A", 1.0, a), closes("B", 1.0, b)]);
        assert_eq!(result.len(), 19);
        assert!(result.pnl.iter().all(|d| (*d - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_window() {
        let to = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let window = HistoryWindow::ending_at(to, 180).unwrap();
        assert_eq!((window.to - window.from).num_days(), 180);
    }

    #[test]
    fn test_window_out_of_range_is_an_error() {
        let to = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        let result = HistoryWindow::ending_at(to, 200_000_000);
        assert!(matches!(
            result,
            Err(PortfolioError::InvalidWindow { days: 200_000_000, .. })
        ));
        assert!(HistoryWindow::ending_at(to, u32::MAX).is_err());
    }
}
