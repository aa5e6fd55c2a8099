//! Process configuration: parsing, environment overrides, and validation.
//!
//! Settings come from an optional TOML file with four sections:
//! - `[service]`: where the model service lives and how long calls may take
//! - `[schedule]`: six-field cron expressions (with seconds) for each task
//! - `[training]`: retraining window and drift gates
//! - `[backfill]`: startup coverage check
//!
//! Every field has a default, so an empty file (or no file) is valid. Environment
//! variables listed in [`apply_env_overrides`] take precedence over the file.
//! [`Settings::validate`] runs last.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_settings_str`]
//! - Parse + validate from a file path: [`load_settings_path`]
//! - File (optional) + environment + validation: [`load_settings`]
//!
//! Lookback windows are stored as configured and only become request parameters
//! through [`TrainingCfg::lookback`] / [`BackfillCfg::lookback`], which clamp them.

use std::{path::Path, time::Duration};

use anyhow::{Context, bail};
use model_service_client::LookbackDays;
use serde::{Deserialize, Serialize};
use shared_utils::env::{get_env_var_opt, parse_env_var};

/// Complete configuration of the control layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Model service location and call ceilings.
    pub service: ServiceCfg,
    /// Task cadences.
    pub schedule: ScheduleCfg,
    /// Retraining window and drift gates.
    pub training: TrainingCfg,
    /// Startup coverage check.
    pub backfill: BackfillCfg,
}

/// Model service location and per-task call ceilings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceCfg {
    /// Base URL of the model service; may carry a path prefix.
    pub base_url: String,
    /// Ceiling for each call made by the ingest task, in seconds.
    pub ingest_timeout_secs: u64,
    /// Ceiling for each call made by the backfill and training tasks, in seconds.
    pub task_timeout_secs: u64,
}

impl Default for ServiceCfg {
    fn default() -> Self {
        Self {
            base_url: "http://pyapi:8000".to_string(),
            ingest_timeout_secs: 5 * 60,
            task_timeout_secs: 30 * 60,
        }
    }
}

impl ServiceCfg {
    /// Per-call ceiling for the ingest task.
    pub fn ingest_timeout(&self) -> Duration {
        Duration::from_secs(self.ingest_timeout_secs)
    }

    /// Per-call ceiling for the backfill and training tasks.
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

/// Cron expressions (`sec min hour day-of-month month day-of-week`) per task.
///
/// The backfill task has no cadence: it runs once when the scheduler starts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScheduleCfg {
    /// Ingestion trigger, every five minutes by default.
    pub ingest: String,
    /// Fixed-cadence retrain, daily at midnight by default.
    pub train_daily: String,
    /// Drift check, hourly by default.
    pub train_drift: String,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            ingest: "0 */5 * * * *".to_string(),
            train_daily: "0 0 0 * * *".to_string(),
            train_drift: "0 0 * * * *".to_string(),
        }
    }
}

/// Retraining window and drift gates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrainingCfg {
    /// Days of history to train on; clamped to 90 before use.
    pub train_days: u32,
    /// Minimum hours since the last training run before drift may trigger a retrain.
    pub train_min_hours: f64,
    /// Retrain unconditionally once the last training run is this old. Unset disables it.
    pub train_max_hours: Option<f64>,
    /// Number of recent prediction-log entries scored for drift.
    pub futures_rolling_n: u32,
    /// Rolling MAPE, in percent, at or above which drift triggers a retrain.
    pub futures_mape_threshold: f64,
}

impl Default for TrainingCfg {
    fn default() -> Self {
        Self {
            train_days: 90,
            train_min_hours: 12.0,
            train_max_hours: None,
            // ~24h of 5-minute samples
            futures_rolling_n: 288,
            futures_mape_threshold: 0.8,
        }
    }
}

impl TrainingCfg {
    /// Training window as sent to the service.
    pub fn lookback(&self) -> LookbackDays {
        LookbackDays::clamped(self.train_days)
    }
}

/// Startup coverage check.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct BackfillCfg {
    /// Whether the backfill task does anything at all.
    pub run_on_startup: bool,
    /// Days of history the coverage check inspects; clamped to 90 before use.
    pub backfill_days: u32,
    /// Coverage ratio below which a backfill is issued.
    pub expected_coverage_ratio: f64,
}

impl Default for BackfillCfg {
    fn default() -> Self {
        Self {
            run_on_startup: true,
            backfill_days: 90,
            expected_coverage_ratio: 0.80,
        }
    }
}

impl BackfillCfg {
    /// Coverage window as sent to the service.
    pub fn lookback(&self) -> LookbackDays {
        LookbackDays::clamped(self.backfill_days)
    }
}

impl Settings {
    /// Check ranges and cross-field constraints.
    ///
    /// Errors:
    /// - Empty base URL or zero timeouts
    /// - Empty cron expressions
    /// - Zero-day windows or a zero rolling window
    /// - Negative or non-finite hour gates / threshold
    /// - `train_max_hours` below `train_min_hours`
    /// - Coverage ratio outside `[0, 1]`
    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.service;
        if s.base_url.trim().is_empty() {
            bail!("service.base_url cannot be empty");
        }
        if s.ingest_timeout_secs == 0 || s.task_timeout_secs == 0 {
            bail!("service timeouts must be greater than zero");
        }

        for (name, expr) in [
            ("schedule.ingest", &self.schedule.ingest),
            ("schedule.train_daily", &self.schedule.train_daily),
            ("schedule.train_drift", &self.schedule.train_drift),
        ] {
            if expr.trim().is_empty() {
                bail!("{name} cannot be empty");
            }
        }

        let t = &self.training;
        if t.train_days == 0 {
            bail!("training.train_days must be at least 1");
        }
        if t.futures_rolling_n == 0 {
            bail!("training.futures_rolling_n must be at least 1");
        }
        if !t.train_min_hours.is_finite() || t.train_min_hours < 0.0 {
            bail!("training.train_min_hours must be a non-negative number");
        }
        if let Some(max) = t.train_max_hours {
            if !max.is_finite() || max < t.train_min_hours {
                bail!(
                    "training.train_max_hours ({max}) must be >= train_min_hours ({})",
                    t.train_min_hours
                );
            }
        }
        if !t.futures_mape_threshold.is_finite() || t.futures_mape_threshold < 0.0 {
            bail!("training.futures_mape_threshold must be a non-negative number");
        }

        let b = &self.backfill;
        if b.backfill_days == 0 {
            bail!("backfill.backfill_days must be at least 1");
        }
        if !(0.0..=1.0).contains(&b.expected_coverage_ratio) {
            bail!(
                "backfill.expected_coverage_ratio must be within [0, 1], got {}",
                b.expected_coverage_ratio
            );
        }
        Ok(())
    }
}

/// Apply environment overrides on top of file settings.
///
/// Recognized variables:
/// `MODEL_SERVICE_BASE_URL`, `TRAIN_DAYS`, `TRAIN_MIN_HOURS`, `TRAIN_MAX_HOURS`,
/// `FUTURES_ROLLING_N`, `FUTURES_MAPE_THRESHOLD`, `BACKFILL_DAYS`,
/// `EXPECTED_COVERAGE_RATIO`, `RUN_BACKFILL_ON_STARTUP`.
///
/// Unset or blank variables leave the setting untouched; unparseable values are errors.
pub fn apply_env_overrides(settings: &mut Settings) -> anyhow::Result<()> {
    if let Some(url) = get_env_var_opt("MODEL_SERVICE_BASE_URL") {
        settings.service.base_url = url;
    }

    let t = &mut settings.training;
    if let Some(v) = parse_env_var("TRAIN_DAYS")? {
        t.train_days = v;
    }
    if let Some(v) = parse_env_var("TRAIN_MIN_HOURS")? {
        t.train_min_hours = v;
    }
    if let Some(v) = parse_env_var("TRAIN_MAX_HOURS")? {
        t.train_max_hours = Some(v);
    }
    if let Some(v) = parse_env_var("FUTURES_ROLLING_N")? {
        t.futures_rolling_n = v;
    }
    if let Some(v) = parse_env_var("FUTURES_MAPE_THRESHOLD")? {
        t.futures_mape_threshold = v;
    }

    let b = &mut settings.backfill;
    if let Some(v) = parse_env_var("BACKFILL_DAYS")? {
        b.backfill_days = v;
    }
    if let Some(v) = parse_env_var("EXPECTED_COVERAGE_RATIO")? {
        b.expected_coverage_ratio = v;
    }
    if let Some(v) = parse_env_var("RUN_BACKFILL_ON_STARTUP")? {
        b.run_on_startup = v;
    }
    Ok(())
}

/// Parse and validate settings from a TOML string. Environment is not consulted.
pub fn load_settings_str(toml_str: &str) -> anyhow::Result<Settings> {
    let settings: Settings = toml::from_str(toml_str).context("failed to parse settings TOML")?;
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Read a settings TOML file from disk, parse, and validate it.
///
/// See [`load_settings_str`] for details.
pub fn load_settings_path(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read settings file {}", path.as_ref().display()))?;
    load_settings_str(&text)
}

/// Load settings the way the host process does: file (if given) or defaults, then
/// environment overrides, then validation.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read settings file {}", p.display()))?;
            toml::from_str(&text).context("failed to parse settings TOML")?
        }
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings).context("invalid environment override")?;
    settings.validate().context("invalid settings")?;
    Ok(settings)
}
