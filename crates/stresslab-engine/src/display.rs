//! Display formatting of stress results.

use serde::{Deserialize, Serialize};
use stresslab_portfolio::{PositionRiskResult, StressResult};

/// Placeholder for a value that is not available.
pub const DASH: &str = "—";

/// One formatted grid row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    /// Exchange ticker
    pub ticker: String,
    /// Display name
    pub name: String,
    /// Type tag
    pub instrument_type: String,
    /// Signed quantity
    pub quantity: f64,
    /// Last price, four decimals, or a dash when not positive
    pub last_price: String,
    /// Market value, two decimals, or a dash when not positive
    pub market_value: String,
    /// Stress P&L, two decimals
    pub stress_pnl: String,
    /// Delta, four decimals, blank when zero
    pub delta: String,
    /// Vega, two decimals, blank when zero
    pub vega: String,
    /// Rho, two decimals, blank when zero
    pub rho: String,
    /// Unformatted market value
    pub market_value_num: f64,
    /// Unformatted stress P&L
    pub stress_pnl_num: f64,
}

impl DisplayRow {
    /// Format one result row.
    pub fn from_result(row: &PositionRiskResult) -> Self {
        Self {
            ticker: row.ticker.clone(),
            name: row.name.clone(),
            instrument_type: row.instrument_type.clone(),
            quantity: row.quantity,
            last_price: positive_or_dash(row.last_price, 4),
            market_value: positive_or_dash(row.market_value, 2),
            stress_pnl: format!("{:.2}", row.stress_pnl),
            delta: nonzero_or_blank(row.greeks.delta, 4),
            vega: nonzero_or_blank(row.greeks.vega, 2),
            rho: nonzero_or_blank(row.greeks.rho, 2),
            market_value_num: row.market_value,
            stress_pnl_num: row.stress_pnl,
        }
    }
}

fn positive_or_dash(value: f64, decimals: usize) -> String {
    if value > 0.0 {
        format!("{value:.decimals$}")
    } else {
        DASH.to_string()
    }
}

fn nonzero_or_blank(value: f64, decimals: usize) -> String {
    if value != 0.0 {
        format!("{value:.decimals$}")
    } else {
        String::new()
    }
}

/// Formatted portfolio totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderText {
    /// "Total value: X CCY"
    pub total_value: String,
    /// "Stress PnL: X CCY"
    pub stress_pnl: String,
    /// "VaR(99%): X CCY", or a hint to load history
    pub var: String,
    /// "ES(99%): X CCY", or a hint to load history
    pub es: String,
}

impl HeaderText {
    /// Header shown before any portfolio is loaded.
    pub fn placeholder() -> Self {
        Self {
            total_value: format!("Total value: {DASH}"),
            stress_pnl: format!("Stress PnL: {DASH}"),
            var: format!("VaR(99%): {DASH}"),
            es: format!("ES(99%): {DASH}"),
        }
    }

    /// Format the totals of a result in `currency`.
    pub fn from_result(result: &StressResult, currency: &str) -> Self {
        Self {
            total_value: format!("Total value: {:.2} {currency}", result.total_market_value),
            stress_pnl: format!("Stress PnL: {:.2} {currency}", result.total_stress_pnl),
            var: tail_text("VaR(99%)", result.var99, currency),
            es: tail_text("ES(99%)", result.es99, currency),
        }
    }
}

fn tail_text(label: &str, value: Option<f64>, currency: &str) -> String {
    match value {
        Some(v) => format!("{label}: {v:.2} {currency}"),
        None => format!("{label}: {DASH} (load history)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stresslab_portfolio::{PositionGreeks, PositionOutcome};
    use stresslab_traits::{Figi, InstrumentKey};

    fn row(last_price: f64, market_value: f64, greeks: PositionGreeks) -> PositionRiskResult {
        PositionRiskResult {
            key: InstrumentKey::Figi(Figi::new("F")),
            ticker: "SBER".into(),
            name: "Sberbank".into(),
            instrument_type: "share".into(),
            quantity: 10.0,
            last_price,
            market_value,
            stress_pnl: -123.456,
            greeks,
            outcome: PositionOutcome::Linear,
        }
    }

    #[test]
    fn test_linear_row() {
        let r = DisplayRow::from_result(&row(280.5, 2805.0, PositionGreeks::default()));
        assert_eq!(r.last_price, "280.5000");
        assert_eq!(r.market_value, "2805.00");
        assert_eq!(r.stress_pnl, "-123.46");
        assert_eq!(r.delta, "");
        assert_eq!(r.vega, "");
        assert_eq!(r.rho, "");
        assert_eq!(r.stress_pnl_num, -123.456);
    }

    #[test]
    fn test_non_positive_values_show_dash() {
        let r = DisplayRow::from_result(&row(0.0, -500.0, PositionGreeks::default()));
        assert_eq!(r.last_price, DASH);
        assert_eq!(r.market_value, DASH);
        assert_eq!(r.market_value_num, -500.0);
    }

    #[test]
    fn test_greeks() {
        let greeks = PositionGreeks {
            delta: 0.53219,
            vega: 19.987,
            rho: -4.0,
        };
        let r = DisplayRow::from_result(&row(0.0, 10.0, greeks));
        assert_eq!(r.delta, "0.5322");
        assert_eq!(r.vega, "19.99");
        assert_eq!(r.rho, "-4.00");
    }

    #[test]
    fn test_header() {
        let mut result = StressResult {
            total_market_value: 1000.0,
            total_stress_pnl: -100.0,
            var99: None,
            es99: None,
            positions: Vec::new(),
        };
        let h = HeaderText::from_result(&result, "RUB");
        assert_eq!(h.total_value, "Total value: 1000.00 RUB");
        assert_eq!(h.stress_pnl, "Stress PnL: -100.00 RUB");
        assert_eq!(h.var, "VaR(99%): — (load history)");
        assert_eq!(h.es, "ES(99%): — (load history)");

        result.var99 = Some(-52.5);
        result.es99 = Some(-61.25);
        let h = HeaderText::from_result(&result, "RUB");
        assert_eq!(h.var, "VaR(99%): -52.50 RUB");
        assert_eq!(h.es, "ES(99%): -61.25 RUB");
    }
}
