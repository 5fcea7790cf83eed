//! Stress command implementation.
//!
//! Loads the portfolio (and optionally its history) and prints the scenario
//! totals with the largest position contributions.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use stresslab_engine::{HeaderText, Recalculation, ShockInputs, StressSession};
use tracing::debug;

use super::{load_settings, open_session, parse_as_of, validate_finite};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{
    print_header, print_info, print_output, print_single, print_totals, print_warning,
    PositionRow,
};

/// Arguments for the stress command.
#[derive(Args, Debug)]
pub struct StressArgs {
    /// Index shock in percent (e.g., -12 for a 12% fall)
    #[arg(long, default_value_t = -12.0, allow_hyphen_values = true)]
    pub index_shock: f64,

    /// Implied volatility shock in percent
    #[arg(long, default_value_t = 40.0, allow_hyphen_values = true)]
    pub vol_shock: f64,

    /// Parallel rate shock in basis points
    #[arg(long, default_value_t = 150.0, allow_hyphen_values = true)]
    pub rate_shock: f64,

    /// Correlation crisis level, nominally 0 to 1
    #[arg(long, default_value_t = 0.35)]
    pub crisis: f64,

    /// Load price history to enable VaR/ES
    #[arg(long)]
    pub with_history: bool,

    /// Maximum number of position rows (overrides display_row_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Valuation time (RFC 3339); defaults to now
    #[arg(long)]
    pub as_of: Option<String>,
}

impl StressArgs {
    fn shocks(&self) -> Result<ShockInputs, CliError> {
        Ok(ShockInputs::default()
            .with_index_shock_pct(validate_finite("index shock", self.index_shock)?)
            .with_vol_shock_pct(validate_finite("vol shock", self.vol_shock)?)
            .with_rate_shock_bps(validate_finite("rate shock", self.rate_shock)?)
            .with_correlation_crisis(validate_finite("crisis level", self.crisis)?))
    }
}

#[derive(Serialize)]
struct StressReport<'a> {
    account_id: &'a str,
    currency: &'a str,
    total_market_value: f64,
    total_stress_pnl: f64,
    var99: Option<f64>,
    es99: Option<f64>,
    insufficient_metadata: usize,
    header: &'a HeaderText,
    positions: Vec<PositionRow>,
}

/// Executes the stress command.
pub async fn execute(
    args: StressArgs,
    config: &Path,
    data_dir: &Path,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let shocks = args.shocks()?;
    let valuation_time = parse_as_of(args.as_of.as_deref())?;

    let mut settings = load_settings(config)?;
    if let Some(limit) = args.limit {
        settings.display_row_limit = limit;
    }
    let session = open_session(data_dir, settings)?;

    let portfolio = session
        .load_portfolio()
        .await
        .map_err(|e| CliError::Engine(format!("Error: {}", e.user_message())))?;
    debug!(positions = portfolio.position_count(), "Portfolio ready");

    if args.with_history {
        load_history(&session, valuation_time).await?;
    }

    let out = session
        .recalculate_at(&shocks, valuation_time)
        .map_err(|e| CliError::Engine(e.user_message()))?;

    render(&out, portfolio.account_id.as_str(), &portfolio.base_currency, format, quiet)
}

async fn load_history(
    session: &StressSession,
    as_of: chrono::DateTime<chrono::Utc>,
) -> Result<(), CliError> {
    let options = session.settings().load_options();
    session
        .load_history_with(as_of, &options)
        .await
        .map_err(|e| CliError::Engine(format!("History load error: {}", e.user_message())))?;
    Ok(())
}

fn render(
    out: &Recalculation,
    account_id: &str,
    currency: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let rows: Vec<PositionRow> = out.rows.iter().map(PositionRow::from).collect();

    match format {
        OutputFormat::Table => {
            if !quiet {
                print_info(&format!("Account {account_id}"));
            }
            print_header("Scenario");
            print_totals(&out.header);
            print_header("Positions");
            print_output(&rows, format)?;

            let missing = out.result.insufficient_metadata_count();
            if missing > 0 {
                print_warning(&format!(
                    "{missing} option position(s) lack pricing metadata and contribute nothing."
                ));
            }
        }
        OutputFormat::Csv => print_output(&rows, format)?,
        OutputFormat::Json => {
            let report = StressReport {
                account_id,
                currency,
                total_market_value: out.result.total_market_value,
                total_stress_pnl: out.result.total_stress_pnl,
                var99: out.result.var99,
                es99: out.result.es99,
                insufficient_metadata: out.result.insufficient_metadata_count(),
                header: &out.header,
                positions: rows,
            };
            print_single(&report, format)?;
        }
        OutputFormat::Minimal => print_totals(&out.header),
    }
    Ok(())
}
