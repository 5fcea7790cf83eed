//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use stresslab_engine::{DisplayRow, HeaderText};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

/// Formats and prints a list of rows.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
        OutputFormat::Minimal => print_minimal(data),
    }
}

/// Prints a single serializable value.
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.serialize(data)?;
            wtr.flush()?;
        }
        _ => println!("{}", serde_json::to_string_pretty(data)?),
    }
    Ok(())
}

fn print_table<T: Tabled>(data: &[T]) -> anyhow::Result<()> {
    if data.is_empty() {
        println!("No positions.");
        return Ok(());
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{table}");
    Ok(())
}

fn print_json<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_minimal<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    if let Some(line) = minimal_line(data)? {
        println!("{line}");
    }
    Ok(())
}

/// First row as compact JSON.
fn minimal_line<T: Serialize>(data: &[T]) -> anyhow::Result<Option<String>> {
    data.first()
        .map(|first| serde_json::to_string(first).map_err(Into::into))
        .transpose()
}

/// Prints an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Prints an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Prints a section header.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Prints the four totals lines.
pub fn print_totals(header: &HeaderText) {
    println!("{}", header.total_value);
    println!("{}", header.stress_pnl.bold());
    println!("{}", header.var);
    println!("{}", header.es);
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Table view of one position row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PositionRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub instrument_type: String,
    #[tabled(rename = "Qty")]
    pub quantity: String,
    #[tabled(rename = "Last")]
    pub last_price: String,
    #[tabled(rename = "MV")]
    pub market_value: String,
    #[tabled(rename = "Stress PnL")]
    pub stress_pnl: String,
    #[tabled(rename = "Delta")]
    pub delta: String,
    #[tabled(rename = "Vega")]
    pub vega: String,
    #[tabled(rename = "Rho")]
    pub rho: String,
}

impl From<&DisplayRow> for PositionRow {
    fn from(row: &DisplayRow) -> Self {
        Self {
            ticker: row.ticker.clone(),
            name: row.name.clone(),
            instrument_type: row.instrument_type.clone(),
            quantity: format_quantity(row.quantity),
            last_price: row.last_price.clone(),
            market_value: row.market_value.clone(),
            stress_pnl: row.stress_pnl.clone(),
            delta: row.delta.clone(),
            vega: row.vega.clone(),
            rho: row.rho.clone(),
        }
    }
}

/// Whole quantities print without a fraction.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}
