//! Z-score: distance of the latest price from its rolling mean, in standard deviations.
//!
//! Z = (P[last] - SMA(n)) / STDDEV(n), population standard deviation.
//! A zero-variance window yields exactly 0.

use super::stats::{mean, population_std, trailing};
use crate::domain::error::ReversionError;

pub fn z_score(prices: &[f64], window: usize) -> Result<f64, ReversionError> {
    let window_prices = trailing(prices, window)?;
    let std = population_std(window_prices);
    if std == 0.0 {
        return Ok(0.0);
    }

    let last = window_prices[window_prices.len() - 1];
    Ok((last - mean(window_prices)) / std)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn z_score_constant_is_zero() {
        assert_eq!(z_score(&[100.0; 20], 20).unwrap(), 0.0);
    }

    #[test]
    fn z_score_known_value() {
        // last 10: nine 100s and a 50 → mean 95, std 15, z = -3
        let mut prices = vec![100.0; 19];
        prices.push(50.0);
        assert_relative_eq!(z_score(&prices, 10).unwrap(), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn z_score_only_uses_trailing_window() {
        let prices = [1000.0, 10.0, 20.0, 30.0];
        let expected = (30.0 - 20.0) / (200.0_f64 / 3.0).sqrt();
        assert_relative_eq!(z_score(&prices, 3).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn z_score_exact_window_length() {
        assert!(z_score(&[1.0, 2.0, 3.0], 3).is_ok());
    }

    #[test]
    fn z_score_insufficient_data() {
        assert!(matches!(
            z_score(&[1.0, 2.0], 3),
            Err(ReversionError::InsufficientData {
                needed: 3,
                available: 2
            })
        ));
    }
}
