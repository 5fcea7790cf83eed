//! CLI command implementations.

pub mod config;
pub mod history;
pub mod stress;

pub use config::ConfigArgs;
pub use history::HistoryArgs;
pub use stress::StressArgs;

use std::path::Path;

use chrono::{DateTime, Utc};
use stresslab_engine::{StressLabSettings, StressSession};

use crate::error::{CliError, CliResult};

/// Loads settings from `path`, falling back to defaults.
pub fn load_settings(path: &Path) -> CliResult<StressLabSettings> {
    StressLabSettings::from_file(path).map_err(|e| CliError::Config(e.to_string()))
}

/// Opens a session over the files in `data_dir`.
///
/// Settings are validated again here, since command flags may have
/// overridden fields after the file was loaded.
pub fn open_session(data_dir: &Path, settings: StressLabSettings) -> CliResult<StressSession> {
    settings
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    let (reference, market) = stresslab_ext_file::create_from_data_dir(data_dir)
        .map_err(|e| CliError::Data(e.to_string()))?;
    Ok(StressSession::new(reference, market, settings))
}

/// Parses an RFC 3339 timestamp, or returns now.
pub fn parse_as_of(raw: Option<&str>) -> CliResult<DateTime<Utc>> {
    match raw {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| CliError::InvalidTimestamp(s.to_string())),
        None => Ok(Utc::now()),
    }
}

/// Rejects NaN and infinite shocks.
pub fn validate_finite(name: &'static str, value: f64) -> CliResult<f64> {
    if !value.is_finite() {
        return Err(CliError::InvalidShock { name, value });
    }
    Ok(value)
}
