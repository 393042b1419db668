//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - %B: (price - lower) / (upper - lower), 0.5 when the bands collapse
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0

use serde::Serialize;

use super::stats::{mean, population_std, trailing};
use crate::domain::error::ReversionError;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
}

pub fn bollinger_bands(prices: &[f64], window: usize, num_std: f64) -> Result<Bands, ReversionError> {
    if !num_std.is_finite() || num_std <= 0.0 {
        return Err(ReversionError::invalid(
            "num_std",
            format!("must be positive, got {num_std}"),
        ));
    }
    let window_prices = trailing(prices, window)?;

    let middle = mean(window_prices);
    let std = population_std(window_prices);
    let upper = middle + std * num_std;
    let lower = middle - std * num_std;

    let last = window_prices[window_prices.len() - 1];
    let percent_b = if upper == lower {
        0.5
    } else {
        (last - lower) / (upper - lower)
    };

    Ok(Bands {
        upper,
        middle,
        lower,
        percent_b,
    })
}
