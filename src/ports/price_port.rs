//! Price-data collaborator port.
//!
//! Implementations are responsible for any retry/backoff before surfacing
//! `RateLimited` or `Network`; the domain never retries.

use crate::domain::error::ReversionError;
use crate::domain::ohlcv::OhlcCandle;
use crate::domain::series::HistoricalPrices;

/// Daily candle period accepted by `get_ohlc`.
pub const DAILY_PERIOD: &str = "1DAY";

pub trait PriceDataPort {
    /// Provider name, part of the cache key.
    fn provider(&self) -> &str;

    /// Whether `get_ohlc` can serve this token.
    fn supports_ohlc(&self, token: &str) -> bool;

    /// Current price in USD.
    fn get_price(&self, token: &str) -> Result<f64, ReversionError>;

    /// Up to `days` daily prices, chronologically ascending.
    fn get_historical_prices(
        &self,
        token: &str,
        days: usize,
    ) -> Result<HistoricalPrices, ReversionError>;

    /// Up to `limit` candles of `period`, chronologically ascending.
    fn get_ohlc(
        &self,
        token: &str,
        period: &str,
        limit: usize,
    ) -> Result<Vec<OhlcCandle>, ReversionError>;
}
