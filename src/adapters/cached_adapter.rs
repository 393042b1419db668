//! Read-through cache over any price-data source.
//!
//! Historical fetches are memoized by `(provider, token, days)` and candle
//! fetches by `(provider, token, period, limit)` for the lifetime of the
//! cache. Entries are never evicted or refreshed, so a long-lived instance
//! serves stale history. Failed fetches are not cached.

use crate::domain::error::ReversionError;
use crate::domain::ohlcv::OhlcCandle;
use crate::domain::series::HistoricalPrices;
use crate::ports::price_port::PriceDataPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: String,
    pub token: String,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OhlcCacheKey {
    pub provider: String,
    pub token: String,
    pub period: String,
    pub limit: usize,
}

pub struct CachedPriceSource<P> {
    inner: P,
    entries: RefCell<HashMap<CacheKey, HistoricalPrices>>,
    candles: RefCell<HashMap<OhlcCacheKey, Vec<OhlcCandle>>>,
}

impl<P: PriceDataPort> CachedPriceSource<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: RefCell::new(HashMap::new()),
            candles: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Cached fetches of either kind.
    pub fn len(&self) -> usize {
        self.entries.borrow().len() + self.candles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn contains_ohlc(&self, key: &OhlcCacheKey) -> bool {
        self.candles.borrow().contains_key(key)
    }
}

fn read_through<K, V>(
    map: &RefCell<HashMap<K, V>>,
    key: K,
    fetch: impl FnOnce() -> Result<V, ReversionError>,
) -> Result<V, ReversionError>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    if let Some(hit) = map.borrow().get(&key) {
        tracing::debug!(?key, "cache hit");
        return Ok(hit.clone());
    }

    tracing::debug!(?key, "cache miss");
    let fetched = fetch()?;
    map.borrow_mut().insert(key, fetched.clone());
    Ok(fetched)
}

impl<P: PriceDataPort> PriceDataPort for CachedPriceSource<P> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn supports_ohlc(&self, token: &str) -> bool {
        self.inner.supports_ohlc(token)
    }

    fn get_price(&self, token: &str) -> Result<f64, ReversionError> {
        self.inner.get_price(token)
    }

    fn get_historical_prices(
        &self,
        token: &str,
        days: usize,
    ) -> Result<HistoricalPrices, ReversionError> {
        let key = CacheKey {
            provider: self.inner.provider().to_string(),
            token: token.to_string(),
            days,
        };
        read_through(&self.entries, key, || {
            self.inner.get_historical_prices(token, days)
        })
    }

    fn get_ohlc(
        &self,
        token: &str,
        period: &str,
        limit: usize,
    ) -> Result<Vec<OhlcCandle>, ReversionError> {
        let key = OhlcCacheKey {
            provider: self.inner.provider().to_string(),
            token: token.to_string(),
            period: period.to_string(),
            limit,
        };
        read_through(&self.candles, key, || {
            self.inner.get_ohlc(token, period, limit)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl PriceDataPort for CountingSource {
        fn provider(&self) -> &str {
            "counting"
        }

        fn supports_ohlc(&self, _token: &str) -> bool {
            false
        }

        fn get_price(&self, _token: &str) -> Result<f64, ReversionError> {
            Ok(1.0)
        }

        fn get_historical_prices(
            &self,
            _token: &str,
            days: usize,
        ) -> Result<HistoricalPrices, ReversionError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ReversionError::RateLimited {
                    provider: "counting".into(),
                });
            }
            Ok(HistoricalPrices {
                prices: vec![1.0; days],
                timestamps: vec!["2024-01-01".to_string(); days],
            })
        }

        fn get_ohlc(
            &self,
            _token: &str,
            _period: &str,
            limit: usize,
        ) -> Result<Vec<OhlcCandle>, ReversionError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ReversionError::RateLimited {
                    provider: "counting".into(),
                });
            }
            let candle = OhlcCandle {
                timestamp: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0.0,
            };
            Ok(vec![candle; limit])
        }
    }

    #[test]
    fn repeated_fetch_hits_cache() {
        let cache = CachedPriceSource::new(CountingSource::new(false));
        let first = cache.get_historical_prices("bitcoin", 30).unwrap();
        let second = cache.get_historical_prices("bitcoin", 30).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.inner().calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_includes_token_and_days() {
        let cache = CachedPriceSource::new(CountingSource::new(false));
        cache.get_historical_prices("bitcoin", 30).unwrap();
        cache.get_historical_prices("bitcoin", 60).unwrap();
        cache.get_historical_prices("ethereum", 30).unwrap();
        assert_eq!(cache.inner().calls.get(), 3);
        assert!(cache.contains(&CacheKey {
            provider: "counting".into(),
            token: "ethereum".into(),
            days: 30,
        }));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = CachedPriceSource::new(CountingSource::new(true));
        assert!(cache.get_historical_prices("bitcoin", 30).is_err());
        assert!(cache.get_historical_prices("bitcoin", 30).is_err());
        assert_eq!(cache.inner().calls.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn candle_fetches_are_cached_by_period_and_limit() {
        let cache = CachedPriceSource::new(CountingSource::new(false));
        let first = cache.get_ohlc("bitcoin", "1DAY", 30).unwrap();
        let second = cache.get_ohlc("bitcoin", "1DAY", 30).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.inner().calls.get(), 1);

        cache.get_ohlc("bitcoin", "1DAY", 60).unwrap();
        cache.get_ohlc("bitcoin", "4HOUR", 30).unwrap();
        assert_eq!(cache.inner().calls.get(), 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.contains_ohlc(&OhlcCacheKey {
            provider: "counting".into(),
            token: "bitcoin".into(),
            period: "4HOUR".into(),
            limit: 30,
        }));
    }

    #[test]
    fn candle_errors_are_not_cached() {
        let cache = CachedPriceSource::new(CountingSource::new(true));
        assert!(cache.get_ohlc("bitcoin", "1DAY", 30).is_err());
        assert!(cache.get_ohlc("bitcoin", "1DAY", 30).is_err());
        assert_eq!(cache.inner().calls.get(), 2);
        assert!(cache.is_empty());
    }
}
