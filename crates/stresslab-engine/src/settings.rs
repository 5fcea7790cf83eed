//! StressLab settings.
//!
//! Settings come from an optional TOML file, with a few fields overridable
//! from the environment:
//!
//! | Variable                            | Field                     |
//! |-------------------------------------|---------------------------|
//! | `STRESSLAB_ACCOUNT_ID`              | `account_id`              |
//! | `STRESSLAB_HISTORY_DAYS`            | `history_days`            |
//! | `STRESSLAB_MAX_HISTORY_INSTRUMENTS` | `max_history_instruments` |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stresslab_portfolio::{PricingAssumptions, StressConfig, DEFAULT_BASE_CURRENCY};

use crate::error::{EngineError, EngineResult};
use crate::retry::LoadOptions;

/// Environment variable overriding the account.
pub const ENV_ACCOUNT_ID: &str = "STRESSLAB_ACCOUNT_ID";
/// Environment variable overriding the history window.
pub const ENV_HISTORY_DAYS: &str = "STRESSLAB_HISTORY_DAYS";
/// Environment variable overriding the history instrument cap.
pub const ENV_MAX_HISTORY_INSTRUMENTS: &str = "STRESSLAB_MAX_HISTORY_INSTRUMENTS";

/// Longest accepted history window, in calendar days.
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// Provider call limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub retry_delay_ms: u64,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 2,
            retry_delay_ms: 250,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressLabSettings {
    /// Account to load; the first listed account when absent.
    pub account_id: Option<String>,

    /// Calendar days of candles requested for the historical series.
    pub history_days: u32,

    /// Largest positions (by absolute market value) used for history.
    pub max_history_instruments: usize,

    /// Implied volatility assumed for every option.
    pub default_option_vol: f64,

    /// Continuously compounded risk-free rate.
    pub default_risk_free_rate: f64,

    /// Continuous dividend yield.
    pub default_dividend_yield: f64,

    /// Rows shown after a recalculation.
    pub display_row_limit: usize,

    /// Position count from which evaluation goes parallel.
    pub parallel_threshold: usize,

    /// Currency used when the broker does not report one.
    pub base_currency_fallback: String,

    /// Provider call limits.
    pub load: LoadSettings,
}

impl Default for StressLabSettings {
    fn default() -> Self {
        Self {
            account_id: None,
            history_days: 180,
            max_history_instruments: 50,
            default_option_vol: 0.50,
            default_risk_free_rate: 0.10,
            default_dividend_yield: 0.0,
            display_row_limit: 500,
            parallel_threshold: StressConfig::default().parallel_threshold,
            base_currency_fallback: DEFAULT_BASE_CURRENCY.to_string(),
            load: LoadSettings::default(),
        }
    }
}

impl StressLabSettings {
    /// Load settings from a TOML file, then apply environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| EngineError::config(format!("{}: {e}", path.display())))?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "Settings file not found, using defaults");
            Self::default()
        };
        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text. Absent fields take their defaults.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        toml::from_str(content).map_err(|e| EngineError::config(e.to_string()))
    }

    /// Render the settings as TOML.
    pub fn to_toml(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> EngineResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> EngineResult<()> {
        if let Some(account) = lookup(ENV_ACCOUNT_ID).filter(|v| !v.trim().is_empty()) {
            self.account_id = Some(account.trim().to_string());
        }
        if let Some(days) = lookup(ENV_HISTORY_DAYS) {
            self.history_days = parse_override(ENV_HISTORY_DAYS, &days)?;
        }
        if let Some(max) = lookup(ENV_MAX_HISTORY_INSTRUMENTS) {
            self.max_history_instruments = parse_override(ENV_MAX_HISTORY_INSTRUMENTS, &max)?;
        }
        Ok(())
    }

    /// Reject settings the loaders cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.history_days == 0 {
            return Err(EngineError::config("history_days must be positive"));
        }
        if self.history_days > MAX_HISTORY_DAYS {
            return Err(EngineError::config(format!(
                "history_days must not exceed {MAX_HISTORY_DAYS}"
            )));
        }
        if self.max_history_instruments == 0 {
            return Err(EngineError::config("max_history_instruments must be positive"));
        }
        if self.display_row_limit == 0 {
            return Err(EngineError::config("display_row_limit must be positive"));
        }
        for (name, value) in [
            ("default_option_vol", self.default_option_vol),
            ("default_risk_free_rate", self.default_risk_free_rate),
            ("default_dividend_yield", self.default_dividend_yield),
        ] {
            if !value.is_finite() {
                return Err(EngineError::config(format!("{name} must be finite")));
            }
        }
        if self.default_option_vol < 0.0 {
            return Err(EngineError::config("default_option_vol must not be negative"));
        }
        if self.load.timeout_secs == 0 {
            return Err(EngineError::config("load.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Option pricing defaults.
    pub fn assumptions(&self) -> PricingAssumptions {
        PricingAssumptions {
            default_vol: self.default_option_vol,
            default_rate: self.default_risk_free_rate,
            default_dividend_yield: self.default_dividend_yield,
        }
    }

    /// Engine computation config.
    pub fn stress_config(&self) -> StressConfig {
        StressConfig::new().with_threshold(self.parallel_threshold)
    }

    /// Provider call limits as load options, without cancellation.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::new()
            .with_timeout(Duration::from_secs(self.load.timeout_secs))
            .with_retries(self.load.retries)
            .with_retry_delay(Duration::from_millis(self.load.retry_delay_ms))
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, raw: &str) -> EngineResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| EngineError::config(format!("{name}: cannot parse '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let s = StressLabSettings::default();
        assert_eq!(s.history_days, 180);
        assert_eq!(s.max_history_instruments, 50);
        assert_eq!(s.display_row_limit, 500);
        assert_eq!(s.base_currency_fallback, "RUB");
        assert_eq!(s.assumptions(), PricingAssumptions::default());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let s = StressLabSettings::from_toml_str(
            r#"
            history_days = 90
            default_option_vol = 0.35

            [load]
            retries = 0
            "#,
        )
        .unwrap();
        assert_eq!(s.history_days, 90);
        assert_eq!(s.default_option_vol, 0.35);
        assert_eq!(s.max_history_instruments, 50);
        assert_eq!(s.load.retries, 0);
        assert_eq!(s.load.timeout_secs, 30);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut s = StressLabSettings::default();
        s.account_id = Some("2000123456".into());
        let text = s.to_toml().unwrap();
        assert_eq!(StressLabSettings::from_toml_str(&text).unwrap(), s);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_HISTORY_DAYS, "30"),
            (ENV_MAX_HISTORY_INSTRUMENTS, " 5 "),
            (ENV_ACCOUNT_ID, "acc-7"),
        ]
        .into_iter()
        .collect();

        let mut s = StressLabSettings::default();
        s.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.history_days, 30);
        assert_eq!(s.max_history_instruments, 5);
        assert_eq!(s.account_id.as_deref(), Some("acc-7"));
    }

    #[test]
    fn test_bad_override() {
        let mut s = StressLabSettings::default();
        let result = s.apply_overrides(|k| (k == ENV_HISTORY_DAYS).then(|| "many".to_string()));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut s = StressLabSettings::default();
        s.history_days = 0;
        assert!(s.validate().is_err());

        let mut s = StressLabSettings::default();
        s.default_option_vol = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_history_days_upper_bound() {
        let mut s = StressLabSettings::default();
        s.history_days = MAX_HISTORY_DAYS;
        assert!(s.validate().is_ok());

        s.history_days = 200_000_000;
        assert!(matches!(s.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = StressLabSettings::from_file(dir.path().join("stresslab.toml")).unwrap();
        assert_eq!(s.display_row_limit, 500);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stresslab.toml");
        std::fs::write(&path, "history_days = \"lots\"").unwrap();
        assert!(matches!(
            StressLabSettings::from_file(&path),
            Err(EngineError::Config(_))
        ));
    }
}
