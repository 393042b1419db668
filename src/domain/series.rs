//! Price history for one asset, either spot prices or OHLC candles.
//!
//! Raw collaborator payloads are normalized here: timestamps are parsed,
//! prices validated and rows ordered chronologically. A `PriceSeries` is
//! immutable for the duration of a calculation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::error::ReversionError;
use super::ohlcv::OhlcCandle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Raw output of `get_historical_prices`: parallel price and ISO-8601 timestamp lists.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalPrices {
    pub prices: Vec<f64>,
    pub timestamps: Vec<String>,
}

impl HistoricalPrices {
    pub fn into_series(self) -> Result<PriceSeries, ReversionError> {
        if self.prices.len() != self.timestamps.len() {
            return Err(ReversionError::invalid(
                "timestamps",
                format!(
                    "{} prices but {} timestamps",
                    self.prices.len(),
                    self.timestamps.len()
                ),
            ));
        }

        let points = self
            .prices
            .into_iter()
            .zip(self.timestamps.iter())
            .map(|(price, ts)| {
                Ok(PricePoint {
                    timestamp: parse_timestamp(ts)?,
                    price,
                })
            })
            .collect::<Result<Vec<_>, ReversionError>>()?;

        PriceSeries::spot(points)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceSeries {
    Spot(Vec<PricePoint>),
    Ohlc(Vec<OhlcCandle>),
}

impl PriceSeries {
    pub fn spot(mut points: Vec<PricePoint>) -> Result<Self, ReversionError> {
        for p in &points {
            if !p.price.is_finite() || p.price <= 0.0 {
                return Err(ReversionError::invalid(
                    "price",
                    format!("price at {} must be positive, got {}", p.timestamp, p.price),
                ));
            }
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(PriceSeries::Spot(points))
    }

    pub fn ohlc(mut candles: Vec<OhlcCandle>) -> Result<Self, ReversionError> {
        for c in &candles {
            c.validate()?;
        }
        candles.sort_by_key(|c| c.timestamp);
        Ok(PriceSeries::Ohlc(candles))
    }

    /// Capability flag: OHLC-only indicators (ATR, MACD) are computed when true.
    pub fn has_ohlc(&self) -> bool {
        matches!(self, PriceSeries::Ohlc(_))
    }

    pub fn len(&self) -> usize {
        match self {
            PriceSeries::Spot(points) => points.len(),
            PriceSeries::Ohlc(candles) => candles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closing prices (spot prices for a spot series).
    pub fn closes(&self) -> Vec<f64> {
        match self {
            PriceSeries::Spot(points) => points.iter().map(|p| p.price).collect(),
            PriceSeries::Ohlc(candles) => candles.iter().map(|c| c.close).collect(),
        }
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        match self {
            PriceSeries::Spot(points) => points.iter().map(|p| p.timestamp).collect(),
            PriceSeries::Ohlc(candles) => candles.iter().map(|c| c.timestamp).collect(),
        }
    }

    pub fn candles(&self) -> Option<&[OhlcCandle]> {
        match self {
            PriceSeries::Spot(_) => None,
            PriceSeries::Ohlc(candles) => Some(candles),
        }
    }

    pub fn last_price(&self) -> Option<f64> {
        match self {
            PriceSeries::Spot(points) => points.last().map(|p| p.price),
            PriceSeries::Ohlc(candles) => candles.last().map(|c| c.close),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ReversionError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ReversionError::invalid("timestamp", format!("unparsable timestamp {raw:?}")))
}
