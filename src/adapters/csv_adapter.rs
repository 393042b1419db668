//! CSV file price-data adapter.
//!
//! One file per token at `<base_path>/<token>.csv`, with either a
//! `timestamp,price` header or `timestamp,open,high,low,close,volume`.

use crate::domain::error::ReversionError;
use crate::domain::ohlcv::OhlcCandle;
use crate::domain::series::{parse_timestamp, HistoricalPrices};
use crate::ports::price_port::{PriceDataPort, DAILY_PERIOD};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::PathBuf;

const OHLC_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];
const SPOT_COLUMNS: [&str; 2] = ["timestamp", "price"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Spot,
    Ohlc,
}

/// Parsed contents of one token file, oldest row first.
enum TokenFile {
    Spot(Vec<(DateTime<Utc>, f64)>),
    Ohlc(Vec<OhlcCandle>),
}

impl TokenFile {
    fn closes(&self) -> Vec<(DateTime<Utc>, f64)> {
        match self {
            TokenFile::Spot(rows) => rows.clone(),
            TokenFile::Ohlc(candles) => candles.iter().map(|c| (c.timestamp, c.close)).collect(),
        }
    }
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, token: &str) -> Result<PathBuf, ReversionError> {
        let valid = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ReversionError::InvalidToken {
                token: token.to_string(),
            });
        }
        Ok(self.base_path.join(format!("{token}.csv")))
    }

    fn open(&self, token: &str) -> Result<csv::Reader<File>, ReversionError> {
        let path = self.csv_path(token)?;
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReversionError::InvalidToken {
                token: token.to_string(),
            },
            _ => ReversionError::Io(e),
        })?;
        Ok(csv::Reader::from_reader(file))
    }

    /// Column layout from the header row alone.
    fn layout(&self, token: &str, rdr: &mut csv::Reader<File>) -> Result<Layout, ReversionError> {
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error in {token}: {e}")))?
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        if headers == OHLC_COLUMNS {
            Ok(Layout::Ohlc)
        } else if headers == SPOT_COLUMNS {
            Ok(Layout::Spot)
        } else {
            Err(data_error(format!(
                "unrecognized columns in {token}.csv: {}",
                headers.join(",")
            )))
        }
    }

    fn load(&self, token: &str) -> Result<TokenFile, ReversionError> {
        let mut rdr = self.open(token)?;
        let mut file = match self.layout(token, &mut rdr)? {
            Layout::Ohlc => TokenFile::Ohlc(Vec::new()),
            Layout::Spot => TokenFile::Spot(Vec::new()),
        };

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {e}")))?;
            let row = line + 2;
            let timestamp = parse_timestamp(field(&record, 0, "timestamp", row)?)
                .map_err(|e| data_error(format!("row {row}: {e}")))?;

            match &mut file {
                TokenFile::Spot(rows) => {
                    let price = number(&record, 1, "price", row)?;
                    if price <= 0.0 {
                        return Err(data_error(format!("row {row}: price must be positive")));
                    }
                    rows.push((timestamp, price));
                }
                TokenFile::Ohlc(candles) => {
                    let candle = OhlcCandle {
                        timestamp,
                        open: number(&record, 1, "open", row)?,
                        high: number(&record, 2, "high", row)?,
                        low: number(&record, 3, "low", row)?,
                        close: number(&record, 4, "close", row)?,
                        volume: number(&record, 5, "volume", row)?,
                    };
                    candle
                        .validate()
                        .map_err(|e| data_error(format!("row {row}: {e}")))?;
                    candles.push(candle);
                }
            }
        }

        match &mut file {
            TokenFile::Spot(rows) => rows.sort_by_key(|r| r.0),
            TokenFile::Ohlc(candles) => candles.sort_by_key(|c| c.timestamp),
        }
        Ok(file)
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn provider(&self) -> &str {
        "csv"
    }

    /// Reads only the header row.
    fn supports_ohlc(&self, token: &str) -> bool {
        self.open(token)
            .and_then(|mut rdr| self.layout(token, &mut rdr))
            .is_ok_and(|layout| layout == Layout::Ohlc)
    }

    fn get_price(&self, token: &str) -> Result<f64, ReversionError> {
        self.load(token)?
            .closes()
            .last()
            .map(|(_, price)| *price)
            .ok_or_else(|| data_error(format!("no prices for {token}")))
    }

    fn get_historical_prices(
        &self,
        token: &str,
        days: usize,
    ) -> Result<HistoricalPrices, ReversionError> {
        let rows = self.load(token)?.closes();
        let skip = rows.len().saturating_sub(days);
        let (timestamps, prices) = rows[skip..]
            .iter()
            .map(|(ts, price)| (ts.to_rfc3339_opts(SecondsFormat::Secs, true), *price))
            .unzip();
        Ok(HistoricalPrices { prices, timestamps })
    }

    fn get_ohlc(
        &self,
        token: &str,
        period: &str,
        limit: usize,
    ) -> Result<Vec<OhlcCandle>, ReversionError> {
        if !period.eq_ignore_ascii_case(DAILY_PERIOD) {
            return Err(ReversionError::invalid(
                "period",
                format!("unsupported period {period:?}, only {DAILY_PERIOD}"),
            ));
        }
        match self.load(token)? {
            TokenFile::Ohlc(mut candles) => {
                let skip = candles.len().saturating_sub(limit);
                Ok(candles.split_off(skip))
            }
            TokenFile::Spot(_) => Err(data_error(format!("{token}.csv has no OHLC columns"))),
        }
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, ReversionError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| data_error(format!("row {row}: missing {name} column")))
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, ReversionError> {
    let raw = field(record, index, name, row)?;
    let value: f64 = raw
        .parse()
        .map_err(|e| data_error(format!("row {row}: invalid {name} value {raw:?}: {e}")))?;
    if !value.is_finite() {
        return Err(data_error(format!("row {row}: {name} is not finite")));
    }
    Ok(value)
}

fn data_error(reason: String) -> ReversionError {
    ReversionError::Data { reason }
}
