//! OHLC candle representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ReversionError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcCandle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcCandle {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Checks `low <= open, close <= high` and that every price is positive.
    pub fn validate(&self) -> Result<(), ReversionError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(ReversionError::invalid(
                "candle",
                format!("non-positive price in candle at {}", self.timestamp),
            ));
        }
        if self.low > self.open.min(self.close) || self.high < self.open.max(self.close) {
            return Err(ReversionError::invalid(
                "candle",
                format!(
                    "candle at {} violates low <= open,close <= high",
                    self.timestamp
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> OhlcCandle {
        OhlcCandle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let candle = sample_candle();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((candle.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candle = sample_candle();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((candle.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let candle = sample_candle();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((candle.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_accepts_well_formed() {
        assert!(sample_candle().validate().is_ok());
    }

    #[test]
    fn validate_rejects_close_above_high() {
        let candle = OhlcCandle {
            close: 115.0,
            ..sample_candle()
        };
        assert!(matches!(
            candle.validate(),
            Err(ReversionError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_price() {
        let candle = OhlcCandle {
            low: 0.0,
            ..sample_candle()
        };
        assert!(candle.validate().is_err());
    }
}
