//! History command implementation.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use stresslab_engine::ShockInputs;

use super::{load_settings, open_session, parse_as_of};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{print_header, print_output, print_single, print_warning, KeyValue};

/// Arguments for the history command.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// History window in calendar days (overrides history_days)
    #[arg(long)]
    pub days: Option<u32>,

    /// Maximum instruments to fetch (overrides max_history_instruments)
    #[arg(long)]
    pub max_instruments: Option<usize>,

    /// End of the history window (RFC 3339); defaults to now
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Serialize)]
struct HistorySummary {
    history_days: u32,
    instruments_used: usize,
    positions: usize,
    observations: usize,
    worst_day: Option<f64>,
    best_day: Option<f64>,
    var99: Option<f64>,
    es99: Option<f64>,
    currency: String,
}

/// Executes the history command.
pub async fn execute(
    args: HistoryArgs,
    config: &Path,
    data_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let as_of = parse_as_of(args.as_of.as_deref())?;

    let mut settings = load_settings(config)?;
    if let Some(days) = args.days {
        settings.history_days = days;
    }
    if let Some(max) = args.max_instruments {
        settings.max_history_instruments = max;
    }
    let history_days = settings.history_days;
    let session = open_session(data_dir, settings)?;

    let portfolio = session
        .load_portfolio()
        .await
        .map_err(|e| CliError::Engine(format!("Error: {}", e.user_message())))?;
    let options = session.settings().load_options();
    let series = session
        .load_history_with(as_of, &options)
        .await
        .map_err(|e| CliError::Engine(format!("History load error: {}", e.user_message())))?;

    // A zero shock leaves only the tail metrics of interest.
    let zero = ShockInputs::default()
        .with_index_shock_pct(0.0)
        .with_vol_shock_pct(0.0)
        .with_rate_shock_bps(0.0)
        .with_correlation_crisis(0.0);
    let out = session
        .recalculate_at(&zero, as_of)
        .map_err(|e| CliError::Engine(e.user_message()))?;

    let summary = HistorySummary {
        history_days,
        instruments_used: series.instruments_used,
        positions: portfolio.position_count(),
        observations: series.len(),
        worst_day: series.pnl.iter().copied().reduce(f64::min),
        best_day: series.pnl.iter().copied().reduce(f64::max),
        var99: out.result.var99,
        es99: out.result.es99,
        currency: portfolio.base_currency.clone(),
    };

    match format {
        OutputFormat::Json | OutputFormat::Csv => print_single(&summary, format)?,
        OutputFormat::Minimal => {
            println!("{}", out.header.var);
            println!("{}", out.header.es);
        }
        OutputFormat::Table => {
            print_header("History");
            let fmt = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |x| format!("{x:.2}"));
            let rows = vec![
                KeyValue::new("History days", summary.history_days.to_string()),
                KeyValue::new(
                    "Instruments used",
                    format!("{}/{}", summary.instruments_used, summary.positions),
                ),
                KeyValue::new("Observations", summary.observations.to_string()),
                KeyValue::new("Worst day", fmt(summary.worst_day)),
                KeyValue::new("Best day", fmt(summary.best_day)),
                KeyValue::new("VaR(99%)", fmt(summary.var99)),
                KeyValue::new("ES(99%)", fmt(summary.es99)),
                KeyValue::new("Currency", summary.currency.clone()),
            ];
            print_output(&rows, format)?;
            if series.len() < 20 {
                print_warning("Fewer than 20 observations: VaR/ES are unavailable.");
            }
        }
    }
    Ok(())
}
