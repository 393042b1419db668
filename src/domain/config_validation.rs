//! Configuration validation.
//!
//! Validates every present key before any analysis or backtest runs. Missing
//! keys fall back to their defaults, which are always valid.

use crate::domain::error::ReversionError;
use crate::ports::config_port::ConfigPort;

pub const KNOWN_PROVIDERS: [&str; 1] = ["csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    validate_data(config)?;
    validate_indicators(config)?;
    validate_mean_reversion(config)?;
    validate_crossover(config)?;
    validate_backtest(config)?;
    validate_score(config)?;
    Ok(())
}

pub fn validate_data(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "csv".to_string());
    if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
        return Err(invalid(
            "data",
            "provider",
            format!("unknown provider {provider:?}"),
        ));
    }
    match config.get_string("data", "path") {
        Some(path) if !path.trim().is_empty() => Ok(()),
        _ => Err(ReversionError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    for key in [
        "z_window",
        "rsi_window",
        "bb_window",
        "atr_window",
        "macd_fast",
        "macd_slow",
        "macd_signal",
    ] {
        positive_int(config, "indicators", key)?;
    }
    positive_double(config, "indicators", "num_std")?;

    let fast = config.get_int("indicators", "macd_fast", 12);
    let slow = config.get_int("indicators", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow".to_string(),
        ));
    }
    Ok(())
}

fn validate_mean_reversion(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    positive_int(config, "mean_reversion", "lookback_period")?;
    positive_int(config, "mean_reversion", "rsi_window")?;
    positive_double(config, "mean_reversion", "num_std")?;

    let lookback = config.get_int("mean_reversion", "lookback_period", 10);
    let rsi_window = config.get_int("mean_reversion", "rsi_window", 10);
    if rsi_window > lookback {
        return Err(invalid(
            "mean_reversion",
            "rsi_window",
            "rsi_window must not exceed lookback_period".to_string(),
        ));
    }

    bounded_double(config, "mean_reversion", "z_threshold", 0.0, f64::INFINITY)?;
    bounded_double(config, "mean_reversion", "rsi_oversold", 0.0, 100.0)?;
    bounded_double(config, "mean_reversion", "rsi_overbought", 0.0, 100.0)?;

    let oversold = config.get_double("mean_reversion", "rsi_oversold", 30.0);
    let overbought = config.get_double("mean_reversion", "rsi_overbought", 70.0);
    if oversold >= overbought {
        return Err(invalid(
            "mean_reversion",
            "rsi_oversold",
            "rsi_oversold must be less than rsi_overbought".to_string(),
        ));
    }
    Ok(())
}

fn validate_crossover(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    positive_int(config, "crossover", "fast_period")?;
    positive_int(config, "crossover", "slow_period")?;
    Ok(())
}

fn validate_backtest(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    positive_double(config, "backtest", "initial_capital")?;
    positive_int(config, "backtest", "days")?;
    Ok(())
}

fn validate_score(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    for key in ["z_multiplier", "z_cap", "rsi_cap", "percent_b_cap"] {
        positive_double(config, "score", key)?;
    }
    Ok(())
}

fn positive_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), ReversionError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(()),
        _ => Err(invalid(
            section,
            key,
            format!("{key} must be a positive integer, got {raw:?}"),
        )),
    }
}

fn positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), ReversionError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(invalid(
            section,
            key,
            format!("{key} must be a positive number, got {raw:?}"),
        )),
    }
}

/// A present key must parse as a finite number within `min..=max`.
fn bounded_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ReversionError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (min..=max).contains(&v) => Ok(()),
        _ if max.is_infinite() => Err(invalid(
            section,
            key,
            format!("{key} must be a number of at least {min}, got {raw:?}"),
        )),
        _ => Err(invalid(
            section,
            key,
            format!("{key} must be a number between {min} and {max}, got {raw:?}"),
        )),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> ReversionError {
    ReversionError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
