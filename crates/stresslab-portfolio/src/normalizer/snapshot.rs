//! Raw broker balances to normalized positions.

use stresslab_traits::analytics::OptionType;
use stresslab_traits::reference_data::{BrokerPositions, InstrumentClass, OptionDirection};
use stresslab_traits::{AccountId, Figi, Quotation};

use super::index::{InstrumentIndex, LastPriceTable};
use crate::portfolio::DEFAULT_BASE_CURRENCY;
use crate::types::{OptionTerms, Position, PricingAssumptions};
use crate::{Portfolio, PortfolioBuilder, PortfolioResult};

/// Display name of an option the directory does not name.
pub const DEFAULT_OPTION_NAME: &str = "Option";

/// Builds a [`Portfolio`] from raw balances, the directory and last prices.
#[derive(Debug, Clone)]
pub struct SnapshotNormalizer {
    fallback_currency: String,
    assumptions: PricingAssumptions,
}

impl Default for SnapshotNormalizer {
    fn default() -> Self {
        Self {
            fallback_currency: DEFAULT_BASE_CURRENCY.to_string(),
            assumptions: PricingAssumptions::default(),
        }
    }
}

impl SnapshotNormalizer {
    /// Creates a normalizer.
    #[must_use]
    pub fn new(fallback_currency: impl Into<String>, assumptions: PricingAssumptions) -> Self {
        Self {
            fallback_currency: fallback_currency.into(),
            assumptions,
        }
    }

    /// Normalize one account snapshot.
    ///
    /// Securities and futures with a blank FIGI are skipped, as are options
    /// with a blank position UID or no directory contract. Everything else is
    /// kept: missing metadata leaves labels empty, and an unresolvable option
    /// underlying is recorded as unlinked rather than dropped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the assembled portfolio fails validation.
    pub fn normalize(
        &self,
        account_id: AccountId,
        raw: &BrokerPositions,
        index: &InstrumentIndex,
        prices: &LastPriceTable,
    ) -> PortfolioResult<Portfolio> {
        let mut positions =
            Vec::with_capacity(raw.securities.len() + raw.futures.len() + raw.options.len());

        let securities = raw.securities.iter().map(|s| (&s.figi, s.balance, None));
        let futures = raw
            .futures
            .iter()
            .map(|f| (&f.figi, f.balance, Some(InstrumentClass::Future)));

        for (figi, quantity, known_class) in securities.chain(futures) {
            if figi.is_blank() {
                continue;
            }
            positions.push(self.linear_position(figi, quantity, known_class, index, prices));
        }

        for balance in &raw.options {
            if balance.position_uid.is_blank() {
                continue;
            }
            let Some(contract) = index.option(&balance.position_uid) else {
                continue;
            };

            let terms = OptionTerms::new(
                index.link_underlying(contract, prices),
                Quotation::to_f64_or_zero(contract.strike_price.as_ref()),
                contract.expiration,
                match contract.direction {
                    OptionDirection::Call => OptionType::Call,
                    OptionDirection::Put | OptionDirection::Unspecified => OptionType::Put,
                },
                Quotation::to_f64_or_zero(contract.basic_asset_size.as_ref()),
            );

            let position = Position::option(contract.position_uid.clone(), balance.balance, terms)
                .with_labels(
                    contract.ticker.clone().unwrap_or_default(),
                    contract
                        .name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OPTION_NAME.to_string()),
                )
                .with_currency(self.currency_or_fallback(contract.currency.as_deref()));
            positions.push(position);
        }

        PortfolioBuilder::new()
            .account_id(account_id.as_str())
            .fallback_currency(self.fallback_currency.clone())
            .assumptions(self.assumptions)
            .add_positions(positions)
            .build()
    }

    fn linear_position(
        &self,
        figi: &Figi,
        quantity: f64,
        known_class: Option<InstrumentClass>,
        index: &InstrumentIndex,
        prices: &LastPriceTable,
    ) -> Position {
        let last_price = prices.get_or_zero(figi);
        match index.instrument(figi) {
            Some(info) => Position::linear(figi.clone(), Some(info.class), quantity, last_price)
                .with_labels(
                    info.ticker.clone().unwrap_or_default(),
                    info.name.clone().unwrap_or_default(),
                )
                .with_currency(self.currency_or_fallback(info.currency.as_deref())),
            None => Position::linear(figi.clone(), known_class, quantity, last_price)
                .with_currency(self.fallback_currency.clone()),
        }
    }

    fn currency_or_fallback(&self, currency: Option<&str>) -> String {
        match currency {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => self.fallback_currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stresslab_traits::market_data::LastPrice;
    use stresslab_traits::reference_data::{
        FutureBalance, InstrumentInfo, OptionBalance, OptionContract, SecurityBalance,
    };
    use stresslab_traits::PositionUid;

    use crate::types::{InstrumentKind, UnderlyingLink};

    fn info(figi: &str, uid: &str, ccy: Option<&str>) -> InstrumentInfo {
        InstrumentInfo {
            figi: Figi::new(figi),
            ticker: Some(figi.to_lowercase()),
            name: Some(format!("{figi} name")),
            currency: ccy.map(str::to_string),
            position_uid: PositionUid::new(uid),
        }
    }

    fn index() -> InstrumentIndex {
        let contract = OptionContract {
            position_uid: PositionUid::new("opt-sber"),
            ticker: Some("SBER-C-300".into()),
            name: None,
            currency: Some("rub".into()),
            basic_asset_position_uid: PositionUid::new("u-sber"),
            strike_price: Some(Quotation::new(300, 0)),
            expiration: Some(Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap()),
            direction: OptionDirection::Call,
            basic_asset_size: Some(Quotation::new(0, 0)),
        };
        InstrumentIndex::from_listings(
            [
                (InstrumentClass::Share, vec![info("SBER", "u-sber", Some("rub"))]),
                (InstrumentClass::Bond, vec![info("OFZ", "u-ofz", None)]),
                (InstrumentClass::Future, vec![info("SiH5", "u-si", Some("rub"))]),
            ],
            vec![contract],
        )
    }

    fn prices() -> LastPriceTable {
        LastPriceTable::from_prices([
            LastPrice { figi: Figi::new("SBER"), price: Quotation::new(280, 0) },
            LastPrice { figi: Figi::new("SiH5"), price: Quotation::new(90_000, 0) },
        ])
    }

    fn raw() -> BrokerPositions {
        BrokerPositions {
            securities: vec![
                SecurityBalance { figi: Figi::new("SBER"), balance: 100.0 },
                SecurityBalance { figi: Figi::new(""), balance: 7.0 },
                SecurityBalance { figi: Figi::new("OFZ"), balance: 10.0 },
                SecurityBalance { figi: Figi::new("UNLISTED"), balance: 3.0 },
            ],
            futures: vec![FutureBalance { figi: Figi::new("SiH5"), balance: -2.0 }],
            options: vec![
                OptionBalance { position_uid: PositionUid::new("opt-sber"), balance: 5.0 },
                OptionBalance { position_uid: PositionUid::new(""), balance: 1.0 },
                OptionBalance { position_uid: PositionUid::new("opt-unknown"), balance: 1.0 },
            ],
        }
    }

    #[test]
    fn test_order_and_skips() {
        let portfolio = SnapshotNormalizer::default()
            .normalize(AccountId::new("acc"), &raw(), &index(), &prices())
            .unwrap();

        let keys: Vec<String> = portfolio.positions.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, vec!["SBER", "OFZ", "UNLISTED", "SiH5", "opt-sber"]);
        assert_eq!(portfolio.base_currency, "rub");
        assert_eq!(portfolio.account_id.as_str(), "acc");
    }

    #[test]
    fn test_linear_mapping() {
        let portfolio = SnapshotNormalizer::default()
            .normalize(AccountId::new("acc"), &raw(), &index(), &prices())
            .unwrap();

        let sber = &portfolio.positions[0];
        assert_eq!(sber.last_price, 280.0);
        assert_eq!(sber.market_value, 28_000.0);
        assert_eq!(sber.type_tag(), "share");
        assert_eq!(sber.ticker, "sber");

        let ofz = &portfolio.positions[1];
        assert_eq!(ofz.last_price, 0.0);
        assert_eq!(ofz.market_value, 0.0);
        assert_eq!(ofz.currency, "RUB");
        assert_eq!(ofz.type_tag(), "bond");

        let unlisted = &portfolio.positions[2];
        assert_eq!(unlisted.ticker, "");
        assert_eq!(unlisted.name, "");
        assert_eq!(unlisted.type_tag(), "");

        let future = &portfolio.positions[3];
        assert_eq!(future.market_value, -180_000.0);
        assert_eq!(future.type_tag(), "future");
    }

    #[test]
    fn test_option_mapping() {
        let portfolio = SnapshotNormalizer::default()
            .normalize(AccountId::new("acc"), &raw(), &index(), &prices())
            .unwrap();

        let option = &portfolio.positions[4];
        assert_eq!(option.name, DEFAULT_OPTION_NAME);
        assert_eq!(option.ticker, "SBER-C-300");
        assert_eq!(option.quantity, 5.0);
        assert_eq!(option.last_price, 0.0);
        assert_eq!(option.market_value, 0.0);

        let InstrumentKind::Option(terms) = &option.kind else {
            panic!("expected option");
        };
        assert_eq!(terms.strike, 300.0);
        assert_eq!(terms.contract_size, 1.0);
        assert_eq!(terms.option_type, OptionType::Call);
        assert!(matches!(terms.underlying, UnderlyingLink::Linked { spot, .. } if spot == 280.0));
    }

    #[test]
    fn test_unpriced_underlying_keeps_option() {
        let portfolio = SnapshotNormalizer::default()
            .normalize(AccountId::new("acc"), &raw(), &index(), &LastPriceTable::default())
            .unwrap();
        let option = portfolio.positions.last().unwrap();
        assert!(option.is_option());
        assert_eq!(option.option_terms().map(|t| t.underlying.spot()), Some(0.0));
    }

    #[test]
    fn test_empty_snapshot_uses_fallback_currency() {
        let normalizer = SnapshotNormalizer::new("USD", PricingAssumptions::default());
        let portfolio = normalizer
            .normalize(
                AccountId::new("acc"),
                &BrokerPositions::default(),
                &InstrumentIndex::new(),
                &LastPriceTable::default(),
            )
            .unwrap();
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.base_currency, "USD");
    }
}
