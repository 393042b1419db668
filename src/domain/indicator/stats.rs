//! Window statistics shared by the indicators.
//!
//! Standard deviation is the POPULATION form (divide by N, not N-1); the
//! Z-score and Bollinger values depend on it.

use crate::domain::error::ReversionError;

pub fn mean(values: &[f64]) -> f64 {
    match values.first() {
        None => 0.0,
        Some(&first) if is_constant(values) => first,
        Some(_) => values.iter().sum::<f64>() / values.len() as f64,
    }
}

/// sqrt(sum((x - mean)^2) / n)
pub fn population_std(values: &[f64]) -> f64 {
    if is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// True for empty or all-equal input; summation rounding must not turn a
/// flat window into a tiny non-zero deviation.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

pub fn require_window(name: &str, window: usize) -> Result<(), ReversionError> {
    if window == 0 {
        return Err(ReversionError::invalid(name, "window must be at least 1"));
    }
    Ok(())
}

pub fn require_len(available: usize, needed: usize) -> Result<(), ReversionError> {
    if available < needed {
        return Err(ReversionError::insufficient(needed, available));
    }
    Ok(())
}

/// The last `window` values; fails when fewer are available.
pub fn trailing(values: &[f64], window: usize) -> Result<&[f64], ReversionError> {
    require_window("window", window)?;
    require_len(values.len(), window)?;
    Ok(&values[values.len() - window..])
}

/// Rolling simple moving average; `None` for the first `period - 1` entries.
///
/// Each entry is the mean of its own window, so a flat stretch reads exactly
/// flat no matter what came before it.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                Some(mean(&values[i + 1 - period..=i]))
            }
        })
        .collect()
}
