//! Config command implementation.
//!
//! Shows the settings a run would use.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use stresslab_engine::StressLabSettings;

use super::load_settings;
use crate::cli::OutputFormat;
use crate::output::{print_info, print_output, print_single, KeyValue};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective settings (file, then environment overrides)
    Show,

    /// Print the default settings as TOML
    Defaults,

    /// Show the settings file location
    Path,
}

/// Executes the config command.
pub fn execute(args: ConfigArgs, config: &Path, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show(&load_settings(config)?, format),
        ConfigCommand::Defaults => {
            print!("{}", StressLabSettings::default().to_toml()?);
            Ok(())
        }
        ConfigCommand::Path => {
            if config.exists() {
                println!("{}", config.display());
            } else {
                print_info(&format!("{} (not found, defaults in use)", config.display()));
            }
            Ok(())
        }
    }
}

fn show(settings: &StressLabSettings, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_single(settings, format),
        OutputFormat::Csv => print_output(&settings_rows(settings), format),
        OutputFormat::Table | OutputFormat::Minimal => {
            print!("{}", settings.to_toml()?);
            Ok(())
        }
    }
}

fn settings_rows(s: &StressLabSettings) -> Vec<KeyValue> {
    vec![
        KeyValue::new(
            "account_id",
            s.account_id.clone().unwrap_or_else(|| "(first listed)".into()),
        ),
        KeyValue::new("history_days", s.history_days.to_string()),
        KeyValue::new("max_history_instruments", s.max_history_instruments.to_string()),
        KeyValue::new("default_option_vol", s.default_option_vol.to_string()),
        KeyValue::new("default_risk_free_rate", s.default_risk_free_rate.to_string()),
        KeyValue::new("default_dividend_yield", s.default_dividend_yield.to_string()),
        KeyValue::new("display_row_limit", s.display_row_limit.to_string()),
        KeyValue::new("parallel_threshold", s.parallel_threshold.to_string()),
        KeyValue::new("base_currency_fallback", s.base_currency_fallback.clone()),
        KeyValue::new("load.timeout_secs", s.load.timeout_secs.to_string()),
        KeyValue::new("load.retries", s.load.retries.to_string()),
        KeyValue::new("load.retry_delay_ms", s.load.retry_delay_ms.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_rows_cover_every_field() {
        let rows = settings_rows(&StressLabSettings::default());
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].value, "(first listed)");
        assert_eq!(rows[1].value, "180");
    }
}
