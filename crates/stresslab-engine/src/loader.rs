//! Portfolio loading: account resolution, directory join and last prices.

use stresslab_portfolio::{
    price_request, InstrumentIndex, LastPriceTable, Portfolio, SnapshotNormalizer,
};
use stresslab_traits::market_data::MarketDataProvider;
use stresslab_traits::reference_data::{InstrumentClass, ReferenceDataProvider};
use stresslab_traits::AccountId;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::retry::{call_with_retry, LoadOptions};
use crate::settings::StressLabSettings;

/// Loads a normalized [`Portfolio`] from the providers.
#[derive(Clone)]
pub struct PortfolioLoader {
    reference: ReferenceDataProvider,
    market: MarketDataProvider,
    account_id: Option<AccountId>,
    normalizer: SnapshotNormalizer,
}

impl PortfolioLoader {
    /// Creates a loader. The account, fallback currency and pricing
    /// defaults come from `settings`.
    pub fn new(
        reference: ReferenceDataProvider,
        market: MarketDataProvider,
        settings: &StressLabSettings,
    ) -> Self {
        Self {
            reference,
            market,
            account_id: settings.account_id.as_deref().map(AccountId::new),
            normalizer: SnapshotNormalizer::new(
                settings.base_currency_fallback.clone(),
                settings.assumptions(),
            ),
        }
    }

    /// The configured account, or the first one the broker lists.
    pub async fn resolve_account(&self, options: &LoadOptions) -> EngineResult<AccountId> {
        if let Some(id) = &self.account_id {
            return Ok(id.clone());
        }

        let positions = &self.reference.positions;
        let accounts = call_with_retry("accounts", options, move || positions.accounts()).await?;
        debug!(count = accounts.len(), "Listed accounts");

        accounts
            .into_iter()
            .next()
            .map(|a| a.id)
            .ok_or(EngineError::NoAccounts)
    }

    /// Build the instrument index from all directory listings.
    pub async fn load_index(&self, options: &LoadOptions) -> EngineResult<InstrumentIndex> {
        let directory = &self.reference.directory;
        let mut index = InstrumentIndex::new();

        for class in InstrumentClass::ALL {
            let listing =
                call_with_retry("instrument directory", options, move || {
                    directory.instruments(class)
                })
                .await?;
            debug!(class = %class, count = listing.len(), "Loaded listing");
            index.add_listing(class, listing);
        }

        let contracts =
            call_with_retry("option contracts", options, move || directory.options()).await?;
        debug!(count = contracts.len(), "Loaded option contracts");
        index.add_options(contracts);

        Ok(index)
    }

    /// Load the current portfolio snapshot.
    ///
    /// # Errors
    ///
    /// Fails when no account can be resolved or a provider call fails.
    /// Missing metadata never fails the load.
    pub async fn load(&self, options: &LoadOptions) -> EngineResult<Portfolio> {
        let account_id = self.resolve_account(options).await?;
        info!(account_id = %account_id, "Loading portfolio");

        let positions = &self.reference.positions;
        let account = &account_id;
        let raw =
            call_with_retry("positions", options, move || positions.positions(account)).await?;

        let index = self.load_index(options).await?;

        let request = price_request(&raw, &index);
        let prices = if request.is_empty() {
            LastPriceTable::default()
        } else {
            let source = &self.market.last_prices;
            let figis = request.as_slice();
            let quotes =
                call_with_retry("last prices", options, move || source.last_prices(figis)).await?;
            LastPriceTable::from_prices(quotes)
        };
        debug!(requested = request.len(), priced = prices.len(), "Loaded last prices");

        let portfolio = self.normalizer.normalize(account_id, &raw, &index, &prices)?;
        info!(
            positions = portfolio.position_count(),
            base_currency = %portfolio.base_currency,
            "Portfolio loaded"
        );
        Ok(portfolio)
    }
}
