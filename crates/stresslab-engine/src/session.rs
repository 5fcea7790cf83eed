//! Interactive session: loads, status reporting and recalculation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stresslab_portfolio::{Portfolio, PortfolioPnlSeries, StressEngine};
use stresslab_traits::market_data::MarketDataProvider;
use stresslab_traits::reference_data::ReferenceDataProvider;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::controller::{Recalculation, RecalculationController, ShockInputs};
use crate::error::{EngineError, EngineResult};
use crate::history_loader::HistoryLoader;
use crate::loader::PortfolioLoader;
use crate::retry::LoadOptions;
use crate::settings::StressLabSettings;

// =============================================================================
// STATUS
// =============================================================================

/// Coarse session status, published on a watch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing has been loaded yet.
    Idle,
    /// Portfolio load running.
    LoadingPortfolio,
    /// History load running.
    LoadingHistory,
    /// Last load succeeded.
    Ready {
        /// Summary of the last load
        message: String,
    },
    /// Last load failed; earlier data is kept.
    Failed {
        /// User-visible failure text
        message: String,
    },
}

impl SessionStatus {
    /// Returns true while a load is running.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::LoadingPortfolio | SessionStatus::LoadingHistory)
    }
}

/// Publishes a loading status and settles it when dropped.
///
/// A load future dropped mid-await leaves `Failed` behind instead of a
/// loading status nothing will clear.
struct StatusGuard<'a> {
    status: &'a watch::Sender<SessionStatus>,
    settled: bool,
}

impl<'a> StatusGuard<'a> {
    fn begin(status: &'a watch::Sender<SessionStatus>, loading: SessionStatus) -> Self {
        status.send_replace(loading);
        Self {
            status,
            settled: false,
        }
    }

    fn finish(mut self, outcome: SessionStatus) {
        self.status.send_replace(outcome);
        self.settled = true;
    }
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Load cancelled before completion");
            self.status.send_replace(SessionStatus::Failed {
                message: "Load cancelled.".into(),
            });
        }
    }
}

/// Relation of the held history to the held portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// No history loaded.
    NotLoaded,
    /// History was built from the current portfolio.
    Current,
    /// History was built from an earlier portfolio load.
    Stale,
}

#[derive(Default)]
struct SessionState {
    portfolio: Option<Arc<Portfolio>>,
    generation: u64,
    history: Option<(Arc<PortfolioPnlSeries>, u64)>,
    note: Option<String>,
}

// =============================================================================
// SESSION
// =============================================================================

/// One user's working session over a portfolio.
///
/// Loads are serialized: while one runs, another is rejected with
/// [`EngineError::LoadInProgress`]. A failed load leaves the previously
/// loaded portfolio and history in place.
pub struct StressSession {
    loader: PortfolioLoader,
    history_loader: HistoryLoader,
    controller: RecalculationController,
    settings: StressLabSettings,
    state: RwLock<SessionState>,
    load_lock: Mutex<()>,
    status: watch::Sender<SessionStatus>,
}

impl StressSession {
    /// Creates a session over the providers with the default engine.
    pub fn new(
        reference: ReferenceDataProvider,
        market: MarketDataProvider,
        settings: StressLabSettings,
    ) -> Self {
        let engine = StressEngine::default().with_config(settings.stress_config());
        Self::with_engine(reference, market, settings, engine)
    }

    /// Creates a session with a custom engine.
    pub fn with_engine(
        reference: ReferenceDataProvider,
        market: MarketDataProvider,
        settings: StressLabSettings,
        engine: StressEngine,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::Idle);
        Self {
            loader: PortfolioLoader::new(reference, market.clone(), &settings),
            history_loader: HistoryLoader::new(market.candles),
            controller: RecalculationController::new(engine)
                .with_row_limit(settings.display_row_limit),
            settings,
            state: RwLock::new(SessionState::default()),
            load_lock: Mutex::new(()),
            status,
        }
    }

    /// Session settings.
    pub fn settings(&self) -> &StressLabSettings {
        &self.settings
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// The loaded portfolio.
    pub fn portfolio(&self) -> Option<Arc<Portfolio>> {
        self.state.read().portfolio.clone()
    }

    /// The loaded history, current or stale.
    pub fn history(&self) -> Option<Arc<PortfolioPnlSeries>> {
        self.state.read().history.as_ref().map(|(h, _)| h.clone())
    }

    /// Whether the held history matches the held portfolio.
    pub fn history_status(&self) -> HistoryStatus {
        let state = self.state.read();
        match &state.history {
            None => HistoryStatus::NotLoaded,
            Some((_, generation)) if *generation == state.generation => HistoryStatus::Current,
            Some(_) => HistoryStatus::Stale,
        }
    }

    /// Informational note from the last successful load.
    pub fn note(&self) -> Option<String> {
        self.state.read().note.clone()
    }

    /// Load the portfolio with the configured limits.
    pub async fn load_portfolio(&self) -> EngineResult<Arc<Portfolio>> {
        self.load_portfolio_with(&self.settings.load_options()).await
    }

    /// Load the portfolio, replacing the current one on success.
    ///
    /// # Errors
    ///
    /// [`EngineError::LoadInProgress`] if another load is running, or the
    /// loader's error. On error the previous portfolio is kept. Dropping the
    /// future before it completes leaves the status at `Failed`.
    pub async fn load_portfolio_with(&self, options: &LoadOptions) -> EngineResult<Arc<Portfolio>> {
        let _guard = self.load_lock.try_lock().map_err(|_| EngineError::LoadInProgress)?;
        let status = StatusGuard::begin(&self.status, SessionStatus::LoadingPortfolio);

        match self.loader.load(options).await {
            Ok(portfolio) => {
                let portfolio = Arc::new(portfolio);
                let count = portfolio.position_count();
                {
                    let mut state = self.state.write();
                    state.portfolio = Some(portfolio.clone());
                    state.generation += 1;
                    state.note = Some("Tip: load history to enable historical VaR/ES.".into());
                }
                status.finish(SessionStatus::Ready {
                    message: format!("Loaded positions: {count}."),
                });
                Ok(portfolio)
            }
            Err(e) => {
                warn!(error = %e, "Portfolio load failed");
                status.finish(SessionStatus::Failed {
                    message: format!("Error: {}", e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// Load history for the current portfolio with the configured limits.
    pub async fn load_history(&self) -> EngineResult<Arc<PortfolioPnlSeries>> {
        self.load_history_with(Utc::now(), &self.settings.load_options())
            .await
    }

    /// Load history for the current portfolio over the window ending at
    /// `as_of`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoPortfolio`] before a portfolio load,
    /// [`EngineError::LoadInProgress`] while another load runs, or the
    /// loader's error. On error the previous history is kept.
    pub async fn load_history_with(
        &self,
        as_of: DateTime<Utc>,
        options: &LoadOptions,
    ) -> EngineResult<Arc<PortfolioPnlSeries>> {
        let _guard = self.load_lock.try_lock().map_err(|_| EngineError::LoadInProgress)?;

        let (portfolio, generation) = {
            let state = self.state.read();
            match &state.portfolio {
                Some(p) => (p.clone(), state.generation),
                None => return Err(EngineError::NoPortfolio),
            }
        };

        let status = StatusGuard::begin(&self.status, SessionStatus::LoadingHistory);
        let result = self
            .history_loader
            .build_history(
                &portfolio,
                self.settings.history_days,
                self.settings.max_history_instruments,
                as_of,
                options,
            )
            .await;

        match result {
            Ok(series) => {
                let series = Arc::new(series);
                let note = format!(
                    "HistoryDays={}, InstrumentsUsed={}/{}",
                    self.settings.history_days,
                    series.instruments_used,
                    portfolio.position_count()
                );
                info!(note = %note, "History loaded");
                {
                    let mut state = self.state.write();
                    state.history = Some((series.clone(), generation));
                    state.note = Some(note);
                }
                status.finish(SessionStatus::Ready {
                    message: "History loaded. VaR/ES enabled.".into(),
                });
                Ok(series)
            }
            Err(e) => {
                warn!(error = %e, "History load failed");
                status.finish(SessionStatus::Failed {
                    message: format!("History load error: {}", e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// Recalculate at the current time.
    pub fn recalculate(&self, shocks: &ShockInputs) -> EngineResult<Recalculation> {
        self.recalculate_at(shocks, Utc::now())
    }

    /// Recalculate the held portfolio with the held history.
    ///
    /// A stale history is still used for VaR/ES until it is reloaded.
    pub fn recalculate_at(
        &self,
        shocks: &ShockInputs,
        valuation_time: DateTime<Utc>,
    ) -> EngineResult<Recalculation> {
        let (portfolio, history) = {
            let state = self.state.read();
            let portfolio = state.portfolio.clone().ok_or(EngineError::NoPortfolio)?;
            (portfolio, state.history.as_ref().map(|(h, _)| h.clone()))
        };
        Ok(self
            .controller
            .recalculate(&portfolio, history.as_deref(), shocks, valuation_time))
    }
}
