//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{ConfigArgs, HistoryArgs, StressArgs};

/// StressLab - Portfolio stress scenarios and historical tail risk
#[derive(Parser)]
#[command(name = "stresslab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (TOML); defaults apply when it does not exist
    #[arg(
        short,
        long,
        env = "STRESSLAB_CONFIG",
        default_value = "stresslab.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Directory holding broker.json, directory.json, last_prices.csv and candles.csv
    #[arg(
        short,
        long,
        env = "STRESSLAB_DATA_DIR",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load the portfolio and run a stress scenario
    Stress(StressArgs),

    /// Load the portfolio and summarize its historical P&L series
    History(HistoryArgs),

    /// Show effective settings
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (totals only)
    Minimal,
}
