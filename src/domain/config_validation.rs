//! Configuration validation.
//!
//! Checks every session, pipeline and comparator key before a session is
//! built. Missing keys fall back to defaults; present keys must parse and
//! be in range.

use crate::domain::chart::TimeWindow;
use crate::domain::error::StockcastError;
use crate::domain::holdout::LINEAR_LOOKBACK;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub const DEFAULT_HISTORY_DAYS: usize = 365;
pub const DEFAULT_FORECAST_HORIZON: usize = 30;
pub const DEFAULT_SEED_PRICE_RATIO: f64 = 0.5;
pub const DEFAULT_HOLDOUT_DAYS: usize = 30;

pub const MIN_HISTORY_DAYS: i64 = 5;
pub const MAX_HISTORY_DAYS: i64 = 36_500;
pub const MAX_FORECAST_HORIZON: i64 = 365;
pub const MAX_SEED_PRICE_RATIO: f64 = 10.0;
pub const MAX_DELAY_MS: i64 = 600_000;

pub const DELAY_KEYS: [&str; 4] = [
    "load_delay_ms",
    "feature_delay_ms",
    "training_delay_ms",
    "forecast_delay_ms",
];

pub fn validate_session_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    validate_history_days(config)?;
    validate_forecast_horizon(config)?;
    validate_seed_price_ratio(config)?;
    validate_seed(config)?;
    validate_window(config)?;
    validate_delays(config)?;
    validate_comparator(config)?;
    validate_catalog(config)?;
    Ok(())
}

/// Parse a key that may be absent. Blank values count as absent.
pub(crate) fn parse_optional<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, StockcastError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| {
                StockcastError::config_invalid(
                    section,
                    key,
                    format!("expected {}, got '{}'", expected, raw.trim()),
                )
            }),
        _ => Ok(None),
    }
}

fn int_in_range(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) -> Result<Option<i64>, StockcastError> {
    let value = parse_optional::<i64>(config, section, key, "an integer")?;
    if let Some(v) = value {
        if v < min || v > max {
            return Err(StockcastError::config_invalid(
                section,
                key,
                format!("{} must be between {} and {}", key, min, max),
            ));
        }
    }
    Ok(value)
}

fn validate_history_days(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    int_in_range(config, "session", "history_days", MIN_HISTORY_DAYS, MAX_HISTORY_DAYS)?;
    Ok(())
}

fn validate_forecast_horizon(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    int_in_range(config, "session", "forecast_horizon", 1, MAX_FORECAST_HORIZON)?;
    Ok(())
}

fn validate_seed_price_ratio(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let value = parse_optional::<f64>(config, "session", "seed_price_ratio", "a number")?;
    if let Some(ratio) = value {
        if !ratio.is_finite() || ratio <= 0.0 || ratio > MAX_SEED_PRICE_RATIO {
            return Err(StockcastError::config_invalid(
                "session",
                "seed_price_ratio",
                format!("seed_price_ratio must be in (0, {}]", MAX_SEED_PRICE_RATIO),
            ));
        }
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    parse_optional::<u64>(config, "session", "seed", "a non-negative integer")?;
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    parse_optional::<TimeWindow>(config, "session", "window", "one of 1D, 1W, 1M, 3M, 6M, 1Y, YTD, ALL")?;
    Ok(())
}

fn validate_delays(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    for key in DELAY_KEYS {
        int_in_range(config, "pipeline", key, 0, MAX_DELAY_MS)?;
    }
    Ok(())
}

fn validate_comparator(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let mode = config
        .get_string("comparator", "mode")
        .map(|m| m.trim().to_lowercase())
        .unwrap_or_default();
    if !matches!(mode.as_str(), "" | "simulated" | "holdout") {
        return Err(StockcastError::config_invalid(
            "comparator",
            "mode",
            "mode must be simulated or holdout",
        ));
    }

    let holdout = int_in_range(config, "comparator", "holdout_days", 1, MAX_HISTORY_DAYS)?
        .unwrap_or(DEFAULT_HOLDOUT_DAYS as i64);
    if mode == "holdout" {
        let history = parse_optional::<i64>(config, "session", "history_days", "an integer")?
            .unwrap_or(DEFAULT_HISTORY_DAYS as i64);
        // a series of `history_days` has history_days + 1 points
        let needed = holdout + LINEAR_LOOKBACK as i64;
        if history + 1 < needed {
            return Err(StockcastError::config_invalid(
                "comparator",
                "holdout_days",
                format!(
                    "holdout_days = {} needs at least {} days of history, have {}",
                    holdout,
                    needed - 1,
                    history
                ),
            ));
        }
    }
    Ok(())
}

fn validate_catalog(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    match config.get_string("catalog", "path") {
        Some(path) if path.trim().is_empty() => Err(StockcastError::ConfigMissing {
            section: "catalog".to_string(),
            key: "path".to_string(),
        }),
        _ => Ok(()),
    }
}
