//! Directory join tables.

use std::collections::{HashMap, HashSet};

use stresslab_traits::market_data::LastPrice;
use stresslab_traits::reference_data::{
    BrokerPositions, InstrumentClass, InstrumentInfo, OptionContract,
};
use stresslab_traits::{Figi, PositionUid};

use crate::types::{UnderlyingLink, UnlinkedReason};

/// Directory metadata of a priced instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedInstrument {
    /// Listing the instrument came from
    pub class: InstrumentClass,
    /// Exchange ticker
    pub ticker: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Trading currency
    pub currency: Option<String>,
    /// Position UID
    pub position_uid: PositionUid,
}

/// Lookup tables built from the instrument directory.
///
/// FIGI and position UID are separate key spaces: an option's underlying
/// is found by position UID and then priced by FIGI.
#[derive(Debug, Clone, Default)]
pub struct InstrumentIndex {
    by_figi: HashMap<Figi, IndexedInstrument>,
    figi_by_uid: HashMap<PositionUid, Figi>,
    options: HashMap<PositionUid, OptionContract>,
}

impl InstrumentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one listing. Entries with a blank FIGI are ignored; a later
    /// entry for the same FIGI replaces an earlier one.
    pub fn add_listing(&mut self, class: InstrumentClass, instruments: Vec<InstrumentInfo>) {
        for info in instruments {
            if info.figi.is_blank() {
                continue;
            }
            if !info.position_uid.is_blank() {
                self.figi_by_uid
                    .insert(info.position_uid.clone(), info.figi.clone());
            }
            self.by_figi.insert(
                info.figi,
                IndexedInstrument {
                    class,
                    ticker: info.ticker,
                    name: info.name,
                    currency: info.currency,
                    position_uid: info.position_uid,
                },
            );
        }
    }

    /// Adds option contracts. Contracts with a blank position UID are ignored.
    pub fn add_options(&mut self, contracts: Vec<OptionContract>) {
        for contract in contracts {
            if contract.position_uid.is_blank() {
                continue;
            }
            self.options.insert(contract.position_uid.clone(), contract);
        }
    }

    /// Builds an index from all listings and the option directory.
    #[must_use]
    pub fn from_listings(
        listings: impl IntoIterator<Item = (InstrumentClass, Vec<InstrumentInfo>)>,
        options: Vec<OptionContract>,
    ) -> Self {
        let mut index = Self::new();
        for (class, instruments) in listings {
            index.add_listing(class, instruments);
        }
        index.add_options(options);
        index
    }

    /// Directory entry for a FIGI.
    #[must_use]
    pub fn instrument(&self, figi: &Figi) -> Option<&IndexedInstrument> {
        self.by_figi.get(figi)
    }

    /// Option contract for a position UID.
    #[must_use]
    pub fn option(&self, uid: &PositionUid) -> Option<&OptionContract> {
        self.options.get(uid)
    }

    /// FIGI of the instrument with the given position UID.
    #[must_use]
    pub fn figi_for_uid(&self, uid: &PositionUid) -> Option<&Figi> {
        if uid.is_blank() {
            return None;
        }
        self.figi_by_uid.get(uid)
    }

    /// Number of priced instruments indexed.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.by_figi.len()
    }

    /// Number of option contracts indexed.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Resolve an option's underlying against the directory and prices.
    #[must_use]
    pub fn link_underlying(&self, contract: &OptionContract, prices: &LastPriceTable) -> UnderlyingLink {
        let uid = &contract.basic_asset_position_uid;
        if uid.is_blank() {
            return UnderlyingLink::Unlinked(UnlinkedReason::NoUnderlying);
        }
        let Some(figi) = self.figi_for_uid(uid) else {
            return UnderlyingLink::Unlinked(UnlinkedReason::UnknownUnderlying {
                position_uid: uid.clone(),
            });
        };
        match prices.get(figi) {
            Some(spot) if spot > 0.0 => UnderlyingLink::Linked {
                position_uid: uid.clone(),
                figi: figi.clone(),
                spot,
            },
            _ => UnderlyingLink::Unlinked(UnlinkedReason::NoLastPrice {
                position_uid: uid.clone(),
                figi: figi.clone(),
            }),
        }
    }
}

/// Last prices keyed by FIGI.
#[derive(Debug, Clone, Default)]
pub struct LastPriceTable {
    prices: HashMap<Figi, f64>,
}

impl LastPriceTable {
    /// Creates a table from provider prices. A repeated FIGI keeps the last price.
    #[must_use]
    pub fn from_prices(prices: impl IntoIterator<Item = LastPrice>) -> Self {
        Self {
            prices: prices
                .into_iter()
                .map(|lp| (lp.figi, lp.price.to_f64()))
                .collect(),
        }
    }

    /// Last price of an instrument.
    #[must_use]
    pub fn get(&self, figi: &Figi) -> Option<f64> {
        self.prices.get(figi).copied()
    }

    /// Last price, zero when unknown.
    #[must_use]
    pub fn get_or_zero(&self, figi: &Figi) -> f64 {
        self.get(figi).unwrap_or(0.0)
    }

    /// Number of priced instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Returns true if no prices are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// FIGIs whose last price is needed to normalize `positions`.
///
/// Securities, then futures, then resolvable option underlyings;
/// deduplicated in first-seen order.
#[must_use]
pub fn price_request(positions: &BrokerPositions, index: &InstrumentIndex) -> Vec<Figi> {
    let mut seen = HashSet::new();
    let mut figis = Vec::new();
    let mut push = |figi: &Figi| {
        if !figi.is_blank() && seen.insert(figi.clone()) {
            figis.push(figi.clone());
        }
    };

    for s in &positions.securities {
        push(&s.figi);
    }
    for f in &positions.futures {
        push(&f.figi);
    }
    for o in &positions.options {
        if let Some(underlying) = index
            .option(&o.position_uid)
            .and_then(|c| index.figi_for_uid(&c.basic_asset_position_uid))
        {
            push(underlying);
        }
    }
    figis
}

#[cfg(test)]
mod tests {
    use super::*;
    use stresslab_traits::reference_data::{OptionBalance, SecurityBalance};
    use stresslab_traits::Quotation;

    fn info(figi: &str, uid: &str) -> InstrumentInfo {
        InstrumentInfo {
            figi: Figi::new(figi),
            ticker: Some(format!("T{figi}")),
            name: None,
            currency: None,
            position_uid: PositionUid::new(uid),
        }
    }

    fn contract(uid: &str, underlying: &str) -> OptionContract {
        OptionContract {
            position_uid: PositionUid::new(uid),
            ticker: None,
            name: None,
            currency: None,
            basic_asset_position_uid: PositionUid::new(underlying),
            strike_price: None,
            expiration: None,
            direction: Default::default(),
            basic_asset_size: None,
        }
    }

    fn sample_index() -> InstrumentIndex {
        InstrumentIndex::from_listings(
            [
                (InstrumentClass::Share, vec![info("SBER", "u-sber"), info("", "u-blank")]),
                (InstrumentClass::Future, vec![info("SiH5", "u-si")]),
            ],
            vec![contract("opt-1", "u-sber"), contract("", "u-sber"), contract("opt-2", "u-missing")],
        )
    }

    #[test]
    fn test_blank_entries_ignored() {
        let index = sample_index();
        assert_eq!(index.instrument_count(), 2);
        assert_eq!(index.option_count(), 2);
        assert!(index.figi_for_uid(&PositionUid::new("u-blank")).is_none());
        assert!(index.figi_for_uid(&PositionUid::default()).is_none());
        assert_eq!(
            index.instrument(&Figi::new("SiH5")).map(|i| i.class),
            Some(InstrumentClass::Future)
        );
    }

    #[test]
    fn test_later_listing_wins() {
        let mut index = InstrumentIndex::new();
        index.add_listing(InstrumentClass::Share, vec![info("X", "u1")]);
        index.add_listing(InstrumentClass::Etf, vec![info("X", "u1")]);
        assert_eq!(index.instrument(&Figi::new("X")).map(|i| i.class), Some(InstrumentClass::Etf));
    }

    #[test]
    fn test_link_underlying_variants() {
        let index = sample_index();
        let prices = LastPriceTable::from_prices([LastPrice {
            figi: Figi::new("SBER"),
            price: Quotation::new(280, 500_000_000),
        }]);

        let linked = index.link_underlying(&contract("opt-1", "u-sber"), &prices);
        assert_eq!(linked.spot(), 280.5);

        let unknown = index.link_underlying(&contract("opt-2", "u-missing"), &prices);
        assert!(matches!(
            unknown,
            UnderlyingLink::Unlinked(UnlinkedReason::UnknownUnderlying { .. })
        ));

        let none = index.link_underlying(&contract("opt-3", ""), &prices);
        assert_eq!(none, UnderlyingLink::Unlinked(UnlinkedReason::NoUnderlying));

        let unpriced = index.link_underlying(&contract("opt-4", "u-si"), &prices);
        assert!(matches!(
            unpriced,
            UnderlyingLink::Unlinked(UnlinkedReason::NoLastPrice { .. })
        ));
    }

    #[test]
    fn test_price_request_dedup_and_order() {
        let index = sample_index();
        let positions = BrokerPositions {
            securities: vec![
                SecurityBalance { figi: Figi::new("GAZP"), balance: 1.0 },
                SecurityBalance { figi: Figi::new(""), balance: 1.0 },
                SecurityBalance { figi: Figi::new("SBER"), balance: 1.0 },
            ],
            futures: vec![],
            options: vec![
                OptionBalance { position_uid: PositionUid::new("opt-1"), balance: 1.0 },
                OptionBalance { position_uid: PositionUid::new("opt-2"), balance: 1.0 },
                OptionBalance { position_uid: PositionUid::new("opt-x"), balance: 1.0 },
            ],
        };
        let figis = price_request(&positions, &index);
        assert_eq!(figis, vec![Figi::new("GAZP"), Figi::new("SBER")]);
    }
}
