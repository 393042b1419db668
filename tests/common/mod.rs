#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use reversion::domain::error::ReversionError;
pub use reversion::domain::ohlcv::OhlcCandle;
use reversion::domain::series::HistoricalPrices;
use reversion::ports::price_port::PriceDataPort;
use std::cell::Cell;
use std::collections::HashMap;
use std::io::Write;

/// In-memory price source. Every history request counts toward `fetches`.
pub struct MockPriceSource {
    pub prices: HashMap<String, Vec<f64>>,
    pub candles: HashMap<String, Vec<OhlcCandle>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            candles: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_prices(mut self, token: &str, prices: Vec<f64>) -> Self {
        self.prices.insert(token.to_string(), prices);
        self
    }

    pub fn with_candles(mut self, token: &str, candles: Vec<OhlcCandle>) -> Self {
        self.candles.insert(token.to_string(), candles);
        self
    }

    pub fn with_error(mut self, token: &str, reason: &str) -> Self {
        self.errors.insert(token.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn check(&self, token: &str) -> Result<(), ReversionError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(token) {
            return Err(ReversionError::Network {
                reason: reason.clone(),
            });
        }
        Ok(())
    }

    fn closes(&self, token: &str) -> Result<Vec<f64>, ReversionError> {
        if let Some(candles) = self.candles.get(token) {
            return Ok(candles.iter().map(|c| c.close).collect());
        }
        self.prices
            .get(token)
            .cloned()
            .ok_or_else(|| ReversionError::InvalidToken {
                token: token.to_string(),
            })
    }
}

impl PriceDataPort for MockPriceSource {
    fn provider(&self) -> &str {
        "mock"
    }

    fn supports_ohlc(&self, token: &str) -> bool {
        self.candles.contains_key(token)
    }

    fn get_price(&self, token: &str) -> Result<f64, ReversionError> {
        self.check(token)?;
        self.closes(token)?
            .last()
            .copied()
            .ok_or_else(|| ReversionError::Data {
                reason: format!("no prices for {token}"),
            })
    }

    fn get_historical_prices(
        &self,
        token: &str,
        days: usize,
    ) -> Result<HistoricalPrices, ReversionError> {
        self.check(token)?;
        let closes = self.closes(token)?;
        let skip = closes.len().saturating_sub(days);
        let prices: Vec<f64> = closes[skip..].to_vec();
        let timestamps = (skip..closes.len()).map(day_timestamp).collect();
        Ok(HistoricalPrices { prices, timestamps })
    }

    fn get_ohlc(
        &self,
        token: &str,
        _period: &str,
        limit: usize,
    ) -> Result<Vec<OhlcCandle>, ReversionError> {
        self.check(token)?;
        let candles = self
            .candles
            .get(token)
            .ok_or_else(|| ReversionError::InvalidToken {
                token: token.to_string(),
            })?;
        let skip = candles.len().saturating_sub(limit);
        Ok(candles[skip..].to_vec())
    }
}

/// RFC 3339 timestamp for day `i` after 2024-01-01.
pub fn day_timestamp(i: usize) -> String {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (base + Duration::days(i as i64)).to_rfc3339()
}

/// Candle with a symmetric 1% range around `close`.
pub fn make_candle(day: usize, close: f64) -> OhlcCandle {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    OhlcCandle {
        timestamp: base + Duration::days(day as i64),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000.0,
    }
}

pub fn candles_from(closes: &[f64]) -> Vec<OhlcCandle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i, c))
        .collect()
}

/// Flat at 100 for 19 days, then a crash to 50.
pub fn crash_series() -> Vec<f64> {
    let mut prices = vec![100.0; 19];
    prices.push(50.0);
    prices
}

/// Deterministic oscillation around 100.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.3).sin())
        .collect()
}

pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

pub fn write_spot_csv(dir: &std::path::Path, token: &str, prices: &[f64]) {
    let mut file = std::fs::File::create(dir.join(format!("{token}.csv"))).unwrap();
    writeln!(file, "timestamp,price").unwrap();
    for (i, p) in prices.iter().enumerate() {
        writeln!(file, "{},{}", day_timestamp(i), p).unwrap();
    }
}

pub fn write_ohlc_csv(dir: &std::path::Path, token: &str, closes: &[f64]) {
    let mut file = std::fs::File::create(dir.join(format!("{token}.csv"))).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for (i, c) in candles_from(closes).iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            day_timestamp(i),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        )
        .unwrap();
    }
}
