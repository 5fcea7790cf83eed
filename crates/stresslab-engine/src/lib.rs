//! # StressLab Engine
//!
//! The I/O-facing half of StressLab: settings, async loaders with timeouts
//! and retries, the recalculation controller and an interactive session.
//!
//! The pure computation lives in `stresslab-portfolio`; this crate wires it
//! to the providers defined in `stresslab-traits`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stresslab_engine::{ShockInputs, StressLabSettings, StressSession};
//!
//! let settings = StressLabSettings::from_file("stresslab.toml")?;
//! let (reference, market) = stresslab_ext_file::create_from_data_dir("data")?;
//! let session = StressSession::new(reference, market, settings);
//!
//! session.load_portfolio().await?;
//! session.load_history().await?;
//!
//! let out = session.recalculate(&ShockInputs::default())?;
//! println!("{}", out.header.stress_pnl);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod controller;
pub mod display;
pub mod error;
pub mod history_loader;
pub mod loader;
pub mod retry;
pub mod session;
pub mod settings;

pub use controller::{Recalculation, RecalculationController, ShockInputs, DEFAULT_ROW_LIMIT};
pub use display::{DisplayRow, HeaderText};
pub use error::{EngineError, EngineResult};
pub use history_loader::HistoryLoader;
pub use loader::PortfolioLoader;
pub use retry::{call_with_retry, cancellation, CancelHandle, CancelToken, LoadOptions};
pub use session::{HistoryStatus, SessionStatus, StressSession};
pub use settings::{LoadSettings, StressLabSettings, MAX_HISTORY_DAYS};
