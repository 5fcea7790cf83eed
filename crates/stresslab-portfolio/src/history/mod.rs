//! Historical portfolio P&L series.
//!
//! The I/O half (fetching candles) lives with the loaders; this module holds
//! the pure half: choosing which instruments to fetch and folding their close
//! prices into one daily P&L series for the current book.

mod series;

pub use series::{
    aggregate_pnl, select_candidates, HistoryCandidate, HistoryWindow, InstrumentCloses,
    PortfolioPnlSeries, MIN_HISTORY_POINTS, MIN_OVERLAP_POINTS,
};
