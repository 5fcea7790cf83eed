//! Broker snapshot normalization.
//!
//! Normalization is split in two pure steps around the price fetch:
//!
//! 1. [`InstrumentIndex`] joins the directory listings and, with
//!    [`price_request`], names every FIGI whose last price is needed.
//! 2. [`SnapshotNormalizer::normalize`] turns raw balances plus the fetched
//!    [`LastPriceTable`] into a [`Portfolio`](crate::Portfolio).

mod index;
mod snapshot;

pub use index::{price_request, IndexedInstrument, InstrumentIndex, LastPriceTable};
pub use snapshot::{SnapshotNormalizer, DEFAULT_OPTION_NAME};
