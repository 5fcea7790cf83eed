//! StressLab CLI - stress scenarios and historical tail risk for a brokerage
//! portfolio.
//!
//! # Usage
//!
//! ```bash
//! # Default scenario: index -12%, vol +40%, rates +150 bps, crisis 0.35
//! stresslab --data-dir data stress
//!
//! # Custom shocks with historical VaR/ES
//! stresslab stress --index-shock -20 --vol-shock 60 --rate-shock 300 --with-history
//!
//! # Historical P&L summary
//! stresslab history
//!
//! # Effective settings
//! stresslab config show
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info,stresslab=debug" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;
    let result = match cli.command {
        Commands::Stress(args) => {
            commands::stress::execute(args, &cli.config, &cli.data_dir, format, cli.quiet).await
        }
        Commands::History(args) => {
            commands::history::execute(args, &cli.config, &cli.data_dir, format).await
        }
        Commands::Config(args) => commands::config::execute(args, &cli.config, format),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
