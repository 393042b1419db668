//! Rolling per-day indicator rows over a price series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ReversionError;
use super::indicator::{
    average_true_range, bollinger, bollinger_bands, macd, rsi, stats, z_score, Bands, Macd,
};
use super::ohlcv::OhlcCandle;
use super::series::PriceSeries;
use super::signal::{self, OverallSignal};

const MAX_ATR_WINDOW: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRow {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub z_score: f64,
    pub rsi: f64,
    pub bands: Bands,
    pub signal: OverallSignal,
    pub atr: Option<f64>,
    pub macd: Option<Macd>,
    pub candle: Option<OhlcCandle>,
}

/// Indicator rows for the last `days` evaluable days.
///
/// Each day `i >= window` is evaluated on the `window + 1` points ending at
/// `i`. OHLC series also carry ATR over `min(14, window)` and MACD once the
/// history up to `i` covers `slow + signal` points.
pub fn historical_indicators(
    series: &PriceSeries,
    window: usize,
    days: usize,
) -> Result<Vec<HistoricalRow>, ReversionError> {
    stats::require_window("window", window)?;
    stats::require_window("days", days)?;
    stats::require_len(series.len(), window + 1)?;

    let closes = series.closes();
    let timestamps = series.timestamps();
    let candles = series.candles();
    let atr_window = window.min(MAX_ATR_WINDOW);
    let macd_needed = macd::DEFAULT_SLOW + macd::DEFAULT_SIGNAL;

    let first = window.max(closes.len().saturating_sub(days));
    let mut rows = Vec::with_capacity(closes.len() - first);

    for i in first..closes.len() {
        let slice = &closes[i - window..=i];
        let z = z_score(slice, window)?;
        let r = rsi(slice, window)?;
        let bands = bollinger_bands(slice, window, bollinger::DEFAULT_NUM_STD)?;
        let overall = signal::aggregate(&[
            signal::interpret_z_score(z),
            signal::interpret_rsi(r),
            signal::interpret_percent_b(bands.percent_b),
        ]);

        let (atr, macd_value, candle) = match candles {
            Some(candles) => {
                let atr = average_true_range(&candles[..=i], atr_window)?;
                let m = if i + 1 >= macd_needed {
                    Some(macd::macd_default(&closes[..=i])?)
                } else {
                    None
                };
                (Some(atr), m, Some(candles[i].clone()))
            }
            None => (None, None, None),
        };

        rows.push(HistoricalRow {
            timestamp: timestamps[i],
            price: closes[i],
            z_score: z,
            rsi: r,
            bands,
            signal: overall,
            atr,
            macd: macd_value,
            candle,
        });
    }

    Ok(rows)
}
