//! Day-by-day backtest simulation with explicit position state.
//!
//! Both strategies share the same all-in/all-out ledger: a BUY converts all
//! capital into holdings at that day's price, a SELL liquidates all holdings.
//! No fees or slippage are modeled, so a round trip at one price is lossless.

use serde::Serialize;
use std::fmt;

use super::error::ReversionError;
use super::indicator::{bollinger_bands, rsi, stats, z_score};
use super::metrics::PerformanceSummary;
use super::signal::{IndicatorSnapshot, SignalRules, TradeSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Flat,
    Long,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat => write!(f, "FLAT"),
            Position::Long => write!(f, "LONG"),
        }
    }
}

/// Ledger state at the close of one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestState {
    pub price: f64,
    pub position: Position,
    pub capital: f64,
    pub holdings: f64,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub states: Vec<BacktestState>,
    /// First evaluated day; earlier rows mirror the initial capital.
    pub start_index: usize,
    /// Percent.
    pub total_return: f64,
    /// Percent, from the price at `start_index` to the last price.
    pub buy_hold_return: f64,
    pub num_trades: usize,
    pub initial_capital: f64,
    pub ending_capital: f64,
    pub summary: PerformanceSummary,
}

impl BacktestResult {
    pub fn evaluated_states(&self) -> &[BacktestState] {
        &self.states[self.start_index.min(self.states.len())..]
    }
}

/// All-in/all-out cash and holdings ledger.
#[derive(Debug, Clone)]
pub(crate) struct Ledger {
    position: Position,
    capital: f64,
    holdings: f64,
}

impl Ledger {
    pub(crate) fn new(initial_capital: f64) -> Self {
        Ledger {
            position: Position::Flat,
            capital: initial_capital,
            holdings: 0.0,
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn buy(&mut self, day: usize, price: f64) {
        self.holdings = self.capital / price;
        self.capital = 0.0;
        self.position = Position::Long;
        tracing::debug!(day, price, holdings = self.holdings, "buy");
    }

    pub(crate) fn sell(&mut self, day: usize, price: f64) {
        self.capital = self.holdings * price;
        self.holdings = 0.0;
        self.position = Position::Flat;
        tracing::debug!(day, price, capital = self.capital, "sell");
    }

    pub(crate) fn state(&self, price: f64) -> BacktestState {
        BacktestState {
            price,
            position: self.position,
            capital: self.capital,
            holdings: self.holdings,
            portfolio_value: self.capital + self.holdings * price,
        }
    }
}

pub(crate) fn validate_inputs(prices: &[f64], initial_capital: f64) -> Result<(), ReversionError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(ReversionError::invalid(
            "initial_capital",
            format!("must be positive, got {initial_capital}"),
        ));
    }
    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(ReversionError::invalid(
            "prices",
            format!("prices must be positive, got {bad}"),
        ));
    }
    Ok(())
}

/// Assemble the result from a completed run. `start_value` is the portfolio
/// value returns are measured against.
pub(crate) fn finish(
    strategy: impl Into<String>,
    states: Vec<BacktestState>,
    start_index: usize,
    start_value: f64,
    initial_capital: f64,
) -> BacktestResult {
    let ending_capital = states
        .last()
        .map(|s| s.portfolio_value)
        .unwrap_or(initial_capital);
    let start_price = states.get(start_index).map(|s| s.price).unwrap_or(0.0);
    let end_price = states.last().map(|s| s.price).unwrap_or(0.0);

    let total_return = if start_value > 0.0 {
        (ending_capital / start_value - 1.0) * 100.0
    } else {
        0.0
    };
    let buy_hold_return = if start_price > 0.0 {
        (end_price / start_price - 1.0) * 100.0
    } else {
        0.0
    };
    let num_trades = states
        .windows(2)
        .filter(|w| w[0].position != w[1].position)
        .count();

    let summary = PerformanceSummary::compute(
        &states[start_index.min(states.len())..],
        total_return,
        buy_hold_return,
    );

    let strategy = strategy.into();
    tracing::info!(
        strategy = %strategy,
        total_return,
        buy_hold_return,
        num_trades,
        "backtest complete"
    );

    BacktestResult {
        strategy,
        states,
        start_index,
        total_return,
        buy_hold_return,
        num_trades,
        initial_capital,
        ending_capital,
        summary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanReversionParams {
    pub lookback_period: usize,
    pub z_threshold: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub rsi_window: usize,
    pub num_std: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            lookback_period: 10,
            z_threshold: 2.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_window: 10,
            num_std: 2.0,
        }
    }
}

impl MeanReversionParams {
    pub fn rules(&self) -> SignalRules {
        SignalRules {
            z_threshold: self.z_threshold,
            rsi_oversold: self.rsi_oversold,
            rsi_overbought: self.rsi_overbought,
        }
    }

    pub fn validate(&self) -> Result<(), ReversionError> {
        stats::require_window("lookback_period", self.lookback_period)?;
        stats::require_window("rsi_window", self.rsi_window)?;
        if self.rsi_window > self.lookback_period {
            return Err(ReversionError::invalid(
                "rsi_window",
                format!(
                    "rsi_window {} exceeds lookback_period {}",
                    self.rsi_window, self.lookback_period
                ),
            ));
        }
        if !self.z_threshold.is_finite() || self.z_threshold < 0.0 {
            return Err(ReversionError::invalid(
                "z_threshold",
                format!("must be non-negative, got {}", self.z_threshold),
            ));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ReversionError::invalid(
                "rsi_oversold",
                format!(
                    "oversold {} must be below overbought {}",
                    self.rsi_oversold, self.rsi_overbought
                ),
            ));
        }
        if !self.num_std.is_finite() || self.num_std <= 0.0 {
            return Err(ReversionError::invalid(
                "num_std",
                format!("must be positive, got {}", self.num_std),
            ));
        }
        Ok(())
    }

    /// Z-score and %B over `lookback_period`, RSI over `rsi_window`, all
    /// ending at the last price of `prices`.
    pub fn snapshot(&self, prices: &[f64]) -> Result<IndicatorSnapshot, ReversionError> {
        Ok(IndicatorSnapshot {
            z_score: z_score(prices, self.lookback_period)?,
            rsi: rsi(prices, self.rsi_window)?,
            percent_b: bollinger_bands(prices, self.lookback_period, self.num_std)?.percent_b,
        })
    }
}

/// Mean-reversion threshold strategy.
///
/// Rows before `lookback_period` are FLAT at the initial capital; from there
/// each day is evaluated on the trailing window ending that day. FLAT → LONG on
/// the buy condition, LONG → FLAT on the sell condition, otherwise carry.
pub fn run_mean_reversion(
    prices: &[f64],
    params: &MeanReversionParams,
    initial_capital: f64,
) -> Result<BacktestResult, ReversionError> {
    params.validate()?;
    validate_inputs(prices, initial_capital)?;
    stats::require_len(prices.len(), params.lookback_period + 1)?;

    let rules = params.rules();
    let mut ledger = Ledger::new(initial_capital);
    let mut states = Vec::with_capacity(prices.len());

    for (i, &price) in prices.iter().enumerate() {
        if i >= params.lookback_period {
            let snapshot = params.snapshot(&prices[..=i])?;
            let signal = if ledger.position() == Position::Flat && rules.buy(&snapshot) {
                TradeSignal::Buy
            } else if ledger.position() == Position::Long && rules.sell(&snapshot) {
                TradeSignal::Sell
            } else {
                TradeSignal::Hold
            };
            match signal {
                TradeSignal::Buy => ledger.buy(i, price),
                TradeSignal::Sell => ledger.sell(i, price),
                TradeSignal::Hold => {}
            }
        }
        states.push(ledger.state(price));
    }

    let start_value = states[params.lookback_period].portfolio_value;
    Ok(finish(
        "Mean Reversion",
        states,
        params.lookback_period,
        start_value,
        initial_capital,
    ))
}
