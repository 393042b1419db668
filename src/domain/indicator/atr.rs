//! Average True Range over OHLC candles.
//!
//! TR[i] = max(H[i] - L[i], |H[i] - C[i-1]|, |L[i] - C[i-1]|) for i >= 1.
//! ATR = simple mean of the last n true ranges. Needs n + 1 candles.

use super::stats::{mean, require_len, require_window};
use crate::domain::error::ReversionError;
use crate::domain::ohlcv::OhlcCandle;

pub const DEFAULT_PERIOD: usize = 14;

pub fn average_true_range(candles: &[OhlcCandle], window: usize) -> Result<f64, ReversionError> {
    require_window("atr_window", window)?;
    require_len(candles.len(), window + 1)?;

    let tail = &candles[candles.len() - window - 1..];
    let true_ranges: Vec<f64> = tail
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .collect();

    Ok(mean(&true_ranges))
}
