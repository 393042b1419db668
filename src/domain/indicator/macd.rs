//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line series
//! Histogram = MACD Line - Signal Line
//!
//! Only the final values are reported. Requires slow + signal prices.

use serde::Serialize;

use super::ema::ema_series;
use super::stats::{require_len, require_window};
use crate::domain::error::ReversionError;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macd {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

pub fn macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<Macd, ReversionError> {
    require_window("macd_fast", fast)?;
    require_window("macd_slow", slow)?;
    require_window("macd_signal", signal_period)?;
    require_len(prices.len(), slow + signal_period)?;

    let ema_fast = ema_series(prices, fast);
    let ema_slow = ema_series(prices, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_series(&line, signal_period);

    let macd_line = line[line.len() - 1];
    let signal_line = signal[signal.len() - 1];
    Ok(Macd {
        macd_line,
        signal_line,
        histogram: macd_line - signal_line,
    })
}

pub fn macd_default(prices: &[f64]) -> Result<Macd, ReversionError> {
    macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
