//! RSI (Relative Strength Index) over the trailing `n` price changes.
//!
//! Simple averages, not Wilder's smoothing:
//! avg_gain = mean(max(delta, 0)), avg_loss = mean(max(-delta, 0)) over the last n deltas.
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); if avg_loss == 0, RSI = 100.
//!
//! Needs n + 1 prices.

use super::stats::{require_len, require_window};
use crate::domain::error::ReversionError;

pub fn rsi(prices: &[f64], window: usize) -> Result<f64, ReversionError> {
    require_window("rsi_window", window)?;
    require_len(prices.len(), window + 1)?;

    let tail = &prices[prices.len() - window - 1..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in tail.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else if change < 0.0 {
            losses -= change;
        }
    }

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;
    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    Ok(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
