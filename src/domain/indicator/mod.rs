//! Technical indicator implementations.
//!
//! Each indicator is a pure function over the trailing window of a price
//! series. This module bundles them:
//! - `Interpretation`: qualitative state of one indicator value
//! - `IndicatorResult`: a value, the window it was computed over, and its state
//! - `IndicatorParams`: windows and multipliers for a full bundle
//! - `IndicatorBundle`: Z-score, RSI, Bollinger, plus ATR/MACD for OHLC input

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stats;
pub mod zscore;

use serde::Serialize;
use std::fmt;

pub use atr::average_true_range;
pub use bollinger::{bollinger_bands, Bands};
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use zscore::z_score;

use crate::domain::error::ReversionError;
use crate::domain::series::PriceSeries;
use crate::domain::signal;

/// Direction an indicator points the price toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpretation {
    /// Undervalued / oversold: reversion upward expected.
    Upward,
    /// Overvalued / overbought: reversion downward expected.
    Downward,
    Neutral,
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpretation::Upward => write!(f, "UPWARD"),
            Interpretation::Downward => write!(f, "DOWNWARD"),
            Interpretation::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub value: f64,
    pub window: usize,
    pub interpretation: Interpretation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerResult {
    pub bands: Bands,
    pub window: usize,
    pub num_std: f64,
    pub interpretation: Interpretation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: Macd,
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub interpretation: Interpretation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorBundle {
    pub z_score: IndicatorResult,
    pub rsi: IndicatorResult,
    pub bollinger: BollingerResult,
    pub atr: Option<IndicatorResult>,
    pub macd: Option<MacdResult>,
}

impl IndicatorBundle {
    pub fn snapshot(&self) -> signal::IndicatorSnapshot {
        signal::IndicatorSnapshot {
            z_score: self.z_score.value,
            rsi: self.rsi.value,
            percent_b: self.bollinger.bands.percent_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub z_window: usize,
    pub rsi_window: usize,
    pub bb_window: usize,
    pub num_std: f64,
    pub atr_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            z_window: 20,
            rsi_window: 14,
            bb_window: bollinger::DEFAULT_PERIOD,
            num_std: bollinger::DEFAULT_NUM_STD,
            atr_window: atr::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
        }
    }
}

impl IndicatorParams {
    /// One window for Z-score, RSI and Bollinger.
    pub fn uniform(window: usize, num_std: f64) -> Self {
        IndicatorParams {
            z_window: window,
            rsi_window: window,
            bb_window: window,
            num_std,
            ..IndicatorParams::default()
        }
    }

    /// Points required for the price-only part of the bundle.
    pub fn required_points(&self) -> usize {
        self.z_window.max(self.rsi_window + 1).max(self.bb_window)
    }

    pub fn validate(&self) -> Result<(), ReversionError> {
        stats::require_window("z_window", self.z_window)?;
        stats::require_window("rsi_window", self.rsi_window)?;
        stats::require_window("bb_window", self.bb_window)?;
        stats::require_window("atr_window", self.atr_window)?;
        stats::require_window("macd_fast", self.macd_fast)?;
        stats::require_window("macd_slow", self.macd_slow)?;
        stats::require_window("macd_signal", self.macd_signal)?;
        if !self.num_std.is_finite() || self.num_std <= 0.0 {
            return Err(ReversionError::invalid(
                "num_std",
                format!("must be positive, got {}", self.num_std),
            ));
        }
        Ok(())
    }
}

/// Z-score, RSI and Bollinger Bands over one window.
///
/// Fails with `InsufficientData` unless `prices` holds `window + 1` points.
pub fn compute_indicators(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Result<IndicatorBundle, ReversionError> {
    compute_price_indicators(prices, &IndicatorParams::uniform(window, num_std))
}

/// Full bundle for either input shape; ATR and MACD only when the series carries OHLC.
pub fn compute_bundle(
    series: &PriceSeries,
    params: &IndicatorParams,
) -> Result<IndicatorBundle, ReversionError> {
    let closes = series.closes();
    let mut bundle = compute_price_indicators(&closes, params)?;

    if let Some(candles) = series.candles() {
        let atr_value = average_true_range(candles, params.atr_window)?;
        bundle.atr = Some(IndicatorResult {
            value: atr_value,
            window: params.atr_window,
            interpretation: Interpretation::Neutral,
        });

        let m = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal)?;
        bundle.macd = Some(MacdResult {
            macd: m,
            fast: params.macd_fast,
            slow: params.macd_slow,
            signal: params.macd_signal,
            interpretation: signal::interpret_macd(&m),
        });
    }

    Ok(bundle)
}

fn compute_price_indicators(
    prices: &[f64],
    params: &IndicatorParams,
) -> Result<IndicatorBundle, ReversionError> {
    params.validate()?;
    stats::require_len(prices.len(), params.required_points())?;

    let z = z_score(prices, params.z_window)?;
    let r = rsi(prices, params.rsi_window)?;
    let bands = bollinger_bands(prices, params.bb_window, params.num_std)?;

    Ok(IndicatorBundle {
        z_score: IndicatorResult {
            value: z,
            window: params.z_window,
            interpretation: signal::interpret_z_score(z),
        },
        rsi: IndicatorResult {
            value: r,
            window: params.rsi_window,
            interpretation: signal::interpret_rsi(r),
        },
        bollinger: BollingerResult {
            bands,
            window: params.bb_window,
            num_std: params.num_std,
            interpretation: signal::interpret_percent_b(bands.percent_b),
        },
        atr: None,
        macd: None,
    })
}
