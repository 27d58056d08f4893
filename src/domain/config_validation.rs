//! Configuration validation.
//!
//! Validates all config fields before a backtest or sweep runs. Absent keys
//! fall back to defaults; present keys that do not parse are rejected rather
//! than silently replaced.

use std::str::FromStr;

use crate::domain::error::MactraderError;
use crate::domain::optimizer::ParamGrid;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;

pub const SENTIMENT_MODES: [&str; 3] = ["off", "fixed", "random"];

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    if config
        .get_string("data", "limit")
        .is_some_and(|v| v.eq_ignore_ascii_case("all"))
    {
        return Ok(());
    }
    if let Some(limit) = parse_value::<usize>(config, "data", "limit")? {
        if limit == 0 {
            return Err(MactraderError::config_invalid(
                "data",
                "limit",
                "limit must be at least 1",
            ));
        }
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    let defaults = StrategyParams::default();
    let short = parse_value::<usize>(config, "strategy", "short_window")?
        .unwrap_or(defaults.short_window);
    let long = parse_value::<usize>(config, "strategy", "long_window")?
        .unwrap_or(defaults.long_window);
    if short == 0 || short >= long {
        return Err(MactraderError::InvalidWindows { short, long });
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    validate_initial_cash(config)?;
    validate_commission(config)?;
    Ok(())
}

pub fn validate_sentiment_config(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    let mode = config
        .get_string("sentiment", "mode")
        .unwrap_or_else(|| "off".to_string())
        .to_lowercase();
    if !SENTIMENT_MODES.contains(&mode.as_str()) {
        return Err(MactraderError::config_invalid(
            "sentiment",
            "mode",
            format!("mode must be one of {}", SENTIMENT_MODES.join(", ")),
        ));
    }

    parse_value::<u64>(config, "sentiment", "seed")?;
    let score = parse_value::<f64>(config, "sentiment", "score")?;
    if mode == "fixed" {
        match score {
            None => {
                return Err(MactraderError::ConfigMissing {
                    section: "sentiment".to_string(),
                    key: "score".to_string(),
                })
            }
            Some(s) if !(-1.0..=1.0).contains(&s) => {
                return Err(MactraderError::config_invalid(
                    "sentiment",
                    "score",
                    "score must be within [-1, 1]",
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn validate_optimize_config(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    for key in ["short_windows", "long_windows"] {
        if let Some(spec) = config.get_string("optimize", key) {
            ParamGrid::parse_windows(&spec)
                .map_err(|reason| MactraderError::config_invalid("optimize", key, reason))?;
        }
    }
    if let Some(top) = parse_value::<usize>(config, "optimize", "top")? {
        if top == 0 {
            return Err(MactraderError::config_invalid(
                "optimize",
                "top",
                "top must be at least 1",
            ));
        }
    }
    Ok(())
}

/// Validate every section a backtest run reads.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    validate_sentiment_config(config)?;
    validate_optimize_config(config)?;
    Ok(())
}

/// Parse `[section] key` when present; a value that does not parse is an error.
pub fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, MactraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            MactraderError::config_invalid(section, key, format!("cannot parse '{}'", raw))
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    if let Some(value) = parse_value::<f64>(config, "backtest", "initial_cash")? {
        // zero cash leaves the total return undefined
        if !value.is_finite() || value <= 0.0 {
            return Err(MactraderError::config_invalid(
                "backtest",
                "initial_cash",
                "initial_cash must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), MactraderError> {
    if let Some(value) = parse_value::<f64>(config, "backtest", "commission")? {
        if !(0.0..1.0).contains(&value) {
            return Err(MactraderError::config_invalid(
                "backtest",
                "commission",
                "commission must be in [0, 1)",
            ));
        }
    }
    Ok(())
}
