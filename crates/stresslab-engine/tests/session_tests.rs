//! Session tests over in-memory providers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use stresslab_engine::*;
use stresslab_ext_file::{InMemoryBroker, InMemoryDirectory, InMemoryMarketData};
use stresslab_portfolio::PortfolioError;
use stresslab_traits::market_data::{DailyCandle, MarketDataProvider};
use stresslab_traits::reference_data::*;
use stresslab_traits::{AccountId, Figi, PositionUid, Quotation, TraitError};

// =============================================================================
// FIXTURES
// =============================================================================

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
}

fn info(figi: &str, ticker: &str, uid: &str) -> InstrumentInfo {
    InstrumentInfo {
        figi: Figi::new(figi),
        ticker: Some(ticker.into()),
        name: Some(format!("{ticker} plc")),
        currency: Some("rub".into()),
        position_uid: PositionUid::new(uid),
    }
}

fn positions() -> BrokerPositions {
    BrokerPositions {
        securities: vec![
            SecurityBalance { figi: Figi::new("SBER"), balance: 100.0 },
            SecurityBalance { figi: Figi::new("GAZP"), balance: -50.0 },
        ],
        futures: vec![],
        options: vec![OptionBalance { position_uid: PositionUid::new("opt-1"), balance: 2.0 }],
    }
}

fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_instrument(InstrumentClass::Share, info("SBER", "SBER", "u-sber"))
        .with_instrument(InstrumentClass::Share, info("GAZP", "GAZP", "u-gazp"))
        .with_option(OptionContract {
            position_uid: PositionUid::new("opt-1"),
            ticker: Some("SBER300C".into()),
            name: None,
            currency: None,
            basic_asset_position_uid: PositionUid::new("u-sber"),
            strike_price: Some(Quotation::new(300, 0)),
            expiration: Some(as_of() + chrono::Duration::days(90)),
            direction: OptionDirection::Call,
            basic_asset_size: Some(Quotation::new(100, 0)),
        })
}

fn candles(days: i64, close: impl Fn(i64) -> i64) -> Vec<DailyCandle> {
    (0..days)
        .map(|i| DailyCandle {
            time: as_of() - chrono::Duration::days(days - i),
            close: Quotation::new(close(i), 0),
        })
        .collect()
}

fn market() -> InMemoryMarketData {
    InMemoryMarketData::new()
        .with_price("SBER", 280.0)
        .with_price("GAZP", 150.0)
        .with_candles("SBER", candles(30, |i| 250 + (i * 7) % 11))
        .with_candles("GAZP", candles(30, |i| 140 + (i * 5) % 9))
}

/// Position source that can be made to fail or stall.
struct FlakyBroker {
    inner: InMemoryBroker,
    fail: AtomicBool,
    delay: Duration,
}

impl FlakyBroker {
    fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryBroker::new().with_account("acc-1", positions()),
            fail: AtomicBool::new(false),
            delay,
        }
    }
}

#[async_trait]
impl PositionSource for FlakyBroker {
    async fn accounts(&self) -> Result<Vec<BrokerAccount>, TraitError> {
        tokio::time::sleep(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(TraitError::AuthenticationFailed("token revoked".into()));
        }
        self.inner.accounts().await
    }

    async fn positions(&self, account_id: &AccountId) -> Result<BrokerPositions, TraitError> {
        self.inner.positions(account_id).await
    }
}

fn settings() -> StressLabSettings {
    let mut settings = StressLabSettings::default();
    settings.load.retries = 0;
    settings.load.timeout_secs = 5;
    settings
}

fn session_with(broker: Arc<dyn PositionSource>, settings: StressLabSettings) -> StressSession {
    let market = Arc::new(market());
    StressSession::new(
        ReferenceDataProvider {
            positions: broker,
            directory: Arc::new(directory()),
        },
        MarketDataProvider {
            last_prices: market.clone(),
            candles: market,
        },
        settings,
    )
}

fn session() -> StressSession {
    session_with(
        Arc::new(InMemoryBroker::new().with_account("acc-1", positions())),
        settings(),
    )
}

// =============================================================================
// PORTFOLIO LOADS
// =============================================================================

#[tokio::test]
async fn test_load_portfolio() {
    let session = session();
    assert_eq!(session.status(), SessionStatus::Idle);

    let portfolio = session.load_portfolio().await.unwrap();
    assert_eq!(portfolio.account_id.as_str(), "acc-1");
    assert_eq!(portfolio.position_count(), 3);
    assert_eq!(portfolio.base_currency, "rub");
    assert_eq!(portfolio.positions[0].market_value, 28_000.0);
    assert_eq!(portfolio.positions[1].market_value, -7_500.0);

    let option = &portfolio.positions[2];
    assert!(option.is_option());
    assert_eq!(option.name, "Option");
    assert_eq!(option.option_terms().map(|t| t.underlying.spot()), Some(280.0));

    assert_eq!(
        session.status(),
        SessionStatus::Ready { message: "Loaded positions: 3.".into() }
    );
    assert_eq!(session.history_status(), HistoryStatus::NotLoaded);
}

#[tokio::test]
async fn test_configured_account_wins() {
    let broker = InMemoryBroker::new()
        .with_account("first", BrokerPositions::default())
        .with_account("acc-1", positions());
    let mut settings = settings();
    settings.account_id = Some("acc-1".into());

    let session = session_with(Arc::new(broker), settings);
    let portfolio = session.load_portfolio().await.unwrap();
    assert_eq!(portfolio.account_id.as_str(), "acc-1");
}

#[tokio::test]
async fn test_no_accounts() {
    let session = session_with(Arc::new(InMemoryBroker::new()), settings());
    let result = session.load_portfolio().await;
    assert!(matches!(result, Err(EngineError::NoAccounts)));
    assert!(matches!(session.status(), SessionStatus::Failed { .. }));
    assert!(session.portfolio().is_none());
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_portfolio() {
    let broker = Arc::new(FlakyBroker::new(Duration::ZERO));
    let session = session_with(broker.clone(), settings());

    let first = session.load_portfolio().await.unwrap();

    broker.fail.store(true, Ordering::SeqCst);
    let result = session.load_portfolio().await;
    assert!(matches!(result, Err(EngineError::Upstream { operation: "accounts", .. })));

    match session.status() {
        SessionStatus::Failed { message } => {
            assert!(message.starts_with("Error: Authentication failed"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    let kept = session.portfolio().unwrap();
    assert!(Arc::ptr_eq(&first, &kept));
    assert!(session.recalculate_at(&ShockInputs::default(), as_of()).is_ok());
}

#[tokio::test]
async fn test_concurrent_load_is_rejected() {
    let broker = Arc::new(FlakyBroker::new(Duration::from_millis(100)));
    let session = session_with(broker, settings());

    let mut status = session.subscribe();
    let second = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(status.borrow_and_update().is_loading());
        session.load_portfolio().await
    };
    let (first, second) = tokio::join!(session.load_portfolio(), second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(EngineError::LoadInProgress)));
}

#[tokio::test]
async fn test_cancelled_load() {
    let broker = Arc::new(FlakyBroker::new(Duration::from_secs(2)));
    let session = session_with(broker, settings());

    let (handle, token) = cancellation();
    let options = settings().load_options().with_cancel(token);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    };
    let (result, ()) = tokio::join!(session.load_portfolio_with(&options), cancel);
    assert!(matches!(result, Err(EngineError::Cancelled)));
    assert!(session.portfolio().is_none());
}

#[tokio::test]
async fn test_dropped_load_settles_status() {
    let broker = Arc::new(FlakyBroker::new(Duration::from_secs(2)));
    let session = session_with(broker, settings());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), session.load_portfolio()).await;
    assert!(abandoned.is_err());

    assert_eq!(
        session.status(),
        SessionStatus::Failed {
            message: "Load cancelled.".into()
        }
    );
    // The load lock is free again.
    assert!(matches!(
        session.load_history().await,
        Err(EngineError::NoPortfolio)
    ));
}

// =============================================================================
// HISTORY AND RECALCULATION
// =============================================================================

#[tokio::test]
async fn test_history_requires_portfolio() {
    let session = session();
    let result = session.load_history_with(as_of(), &settings().load_options()).await;
    assert!(matches!(result, Err(EngineError::NoPortfolio)));
    assert!(matches!(
        session.recalculate_at(&ShockInputs::default(), as_of()),
        Err(EngineError::NoPortfolio)
    ));
}

#[tokio::test]
async fn test_history_enables_tail_risk() {
    let session = session();
    session.load_portfolio().await.unwrap();

    let before = session.recalculate_at(&ShockInputs::default(), as_of()).unwrap();
    assert!(before.result.var99.is_none());
    assert_eq!(before.header.var, "VaR(99%): — (load history)");

    let series = session
        .load_history_with(as_of(), &settings().load_options())
        .await
        .unwrap();
    assert_eq!(series.len(), 29);
    assert_eq!(series.instruments_used, 2);
    assert_eq!(session.history_status(), HistoryStatus::Current);
    assert_eq!(
        session.note().as_deref(),
        Some("HistoryDays=180, InstrumentsUsed=2/3")
    );
    assert_eq!(
        session.status(),
        SessionStatus::Ready { message: "History loaded. VaR/ES enabled.".into() }
    );

    let after = session.recalculate_at(&ShockInputs::default(), as_of()).unwrap();
    assert!(after.result.has_tail_risk());
    assert!(after.header.var.ends_with(" rub"));
    assert!(after.result.es99.unwrap() <= after.result.var99.unwrap());

    // stress P&L does not depend on history
    assert_eq!(before.result.total_stress_pnl, after.result.total_stress_pnl);
}

#[tokio::test]
async fn test_reload_marks_history_stale() {
    let session = session();
    session.load_portfolio().await.unwrap();
    session
        .load_history_with(as_of(), &settings().load_options())
        .await
        .unwrap();
    assert_eq!(session.history_status(), HistoryStatus::Current);

    session.load_portfolio().await.unwrap();
    assert_eq!(session.history_status(), HistoryStatus::Stale);
    assert!(session.history().is_some());
}

#[tokio::test]
async fn test_short_history_gives_no_tail_risk() {
    let mut settings = settings();
    settings.history_days = 10;
    let session = session_with(
        Arc::new(InMemoryBroker::new().with_account("acc-1", positions())),
        settings.clone(),
    );
    session.load_portfolio().await.unwrap();

    let series = session
        .load_history_with(as_of(), &settings.load_options())
        .await
        .unwrap();
    assert!(series.is_empty());
    assert_eq!(series.instruments_used, 0);

    let out = session.recalculate_at(&ShockInputs::default(), as_of()).unwrap();
    assert!(out.result.var99.is_none());
}

#[tokio::test]
async fn test_out_of_range_window_fails_without_losing_history() {
    let session = session();
    session.load_portfolio().await.unwrap();
    let first = session
        .load_history_with(as_of(), &settings().load_options())
        .await
        .unwrap();

    let far_past = DateTime::<Utc>::MIN_UTC;
    let result = session
        .load_history_with(far_past, &settings().load_options())
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Portfolio(PortfolioError::InvalidWindow { .. }))
    ));
    assert!(matches!(session.status(), SessionStatus::Failed { .. }));
    assert!(Arc::ptr_eq(&first, &session.history().unwrap()));
}

#[tokio::test]
async fn test_option_row_is_priced() {
    let session = session();
    session.load_portfolio().await.unwrap();

    let out = session.recalculate_at(&ShockInputs::default(), as_of()).unwrap();
    let option = out
        .rows
        .iter()
        .find(|r| r.instrument_type == "option")
        .unwrap();
    assert!(!option.delta.is_empty());
    assert!(option.market_value_num > 0.0);
    assert_eq!(out.result.insufficient_metadata_count(), 0);
}
