//! End-to-end tests of the `stresslab` binary over a temporary data directory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BROKER: &str = r#"{
  "accounts": [{"id": "acc-1", "name": "Main"}],
  "positions": {
    "acc-1": {
      "securities": [{"figi": "BBG004730N88", "balance": 100}],
      "futures": [],
      "options": []
    }
  }
}"#;

const DIRECTORY: &str = r#"{
  "shares": [
    {"figi": "BBG004730N88", "ticker": "SBER", "name": "Sberbank", "currency": "rub", "position_uid": "u-sber"}
  ]
}"#;

fn candles(days: u32) -> String {
    let mut out = String::from("figi,date,close\n");
    for d in 0..days {
        let close = 250 + (d * 7) % 13;
        writeln!(out, "BBG004730N88,2025-01-{:02},{close}", d + 1).unwrap();
    }
    out
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broker.json", BROKER);
    write(dir.path(), "directory.json", DIRECTORY);
    write(dir.path(), "last_prices.csv", "figi,price\nBBG004730N88,280\n");
    write(dir.path(), "candles.csv", &candles(31));
    dir
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn stresslab(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stresslab").unwrap();
    cmd.env_remove("STRESSLAB_ACCOUNT_ID")
        .env_remove("STRESSLAB_HISTORY_DAYS")
        .env_remove("STRESSLAB_MAX_HISTORY_INSTRUMENTS")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--config")
        .arg(dir.path().join("stresslab.toml"));
    cmd
}

#[test]
fn test_stress_minimal_totals() {
    let dir = data_dir();
    stresslab(&dir)
        .args(["--format", "minimal", "stress", "--index-shock", "-10", "--crisis", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total value: 28000.00 rub"))
        .stdout(predicate::str::contains("Stress PnL: -2800.00 rub"))
        .stdout(predicate::str::contains("VaR(99%): — (load history)"));
}

#[test]
fn test_stress_table_lists_positions() {
    let dir = data_dir();
    stresslab(&dir)
        .arg("stress")
        .assert()
        .success()
        .stdout(predicate::str::contains("SBER"))
        .stdout(predicate::str::contains("Sberbank"));
}

#[test]
fn test_stress_with_history_enables_var() {
    let dir = data_dir();
    stresslab(&dir)
        .args([
            "--format",
            "json",
            "stress",
            "--with-history",
            "--as-of",
            "2025-02-01T00:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"var99\": null").not())
        .stdout(predicate::str::contains("\"account_id\": \"acc-1\""));
}

#[test]
fn test_history_summary() {
    let dir = data_dir();
    stresslab(&dir)
        .args(["history", "--as-of", "2025-02-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Instruments used"))
        .stdout(predicate::str::contains("1/1"));
}

#[test]
fn test_missing_data_dir_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("stresslab")
        .unwrap()
        .arg("--data-dir")
        .arg(dir.path().join("absent"))
        .arg("--config")
        .arg(dir.path().join("stresslab.toml"))
        .arg("stress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data error"));
}

#[test]
fn test_no_accounts_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broker.json", r#"{"accounts": [], "positions": {}}"#);
    stresslab(&dir)
        .arg("stress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = data_dir();
    write(dir.path(), "stresslab.toml", "history_days = 90\n");
    stresslab(&dir)
        .args(["--format", "minimal", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("history_days = 90"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = data_dir();
    write(dir.path(), "stresslab.toml", "history_days = 0\n");
    stresslab(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_history_days_flag_is_validated() {
    let dir = data_dir();
    for days in ["0", "200000000"] {
        stresslab(&dir)
            .args(["history", "--days", days])
            .assert()
            .failure()
            .stderr(predicate::str::contains("history_days"));
    }
}
