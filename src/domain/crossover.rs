//! Moving-average crossover strategy.
//!
//! The daily signal is the sign of `fast_ma - slow_ma`: +1 above, -1 below, 0
//! where the averages are equal or not yet defined. The position on day t
//! follows the signal of day t-1: +1 targets LONG, -1 targets FLAT, 0 holds.

use serde::Serialize;

use super::backtest::{finish, validate_inputs, BacktestResult, Ledger, Position};
use super::error::ReversionError;
use super::indicator::stats;
use super::signal::TradeSignal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        CrossoverParams {
            fast_period: 10,
            slow_period: 50,
        }
    }
}

impl CrossoverParams {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        CrossoverParams {
            fast_period,
            slow_period,
        }
    }

    /// First evaluated day; both averages are defined from here on.
    pub fn start_index(&self) -> usize {
        self.fast_period.max(self.slow_period)
    }

    pub fn validate(&self) -> Result<(), ReversionError> {
        stats::require_window("fast_period", self.fast_period)?;
        stats::require_window("slow_period", self.slow_period)?;
        Ok(())
    }

    pub fn label(&self) -> String {
        format!("MA Crossover ({}/{})", self.fast_period, self.slow_period)
    }
}

/// Per-day crossover signal in {-1, 0, +1}.
pub fn crossover_signals(prices: &[f64], params: &CrossoverParams) -> Vec<i8> {
    let fast = stats::rolling_mean(prices, params.fast_period);
    let slow = stats::rolling_mean(prices, params.slow_period);

    fast.iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) if f > s => 1,
            (Some(f), Some(s)) if f < s => -1,
            _ => 0,
        })
        .collect()
}

/// Latest crossover signal as BUY (fast above slow), SELL (below) or HOLD.
pub fn crossover_signal(
    prices: &[f64],
    params: &CrossoverParams,
) -> Result<TradeSignal, ReversionError> {
    params.validate()?;
    stats::require_len(prices.len(), params.start_index())?;

    let signal = crossover_signals(prices, params)
        .last()
        .copied()
        .unwrap_or(0);
    Ok(match signal {
        1 => TradeSignal::Buy,
        -1 => TradeSignal::Sell,
        _ => TradeSignal::Hold,
    })
}

/// Crossover backtest. The ledger starts FLAT with `initial_capital` at
/// `max(fast, slow)`; returns are measured against `initial_capital`.
pub fn run_ma_crossover(
    prices: &[f64],
    params: &CrossoverParams,
    initial_capital: f64,
) -> Result<BacktestResult, ReversionError> {
    params.validate()?;
    validate_inputs(prices, initial_capital)?;
    let start = params.start_index();
    stats::require_len(prices.len(), start + 1)?;

    let signals = crossover_signals(prices, params);
    let mut ledger = Ledger::new(initial_capital);
    let mut states = Vec::with_capacity(prices.len());

    for (i, &price) in prices.iter().enumerate() {
        if i >= start {
            match (signals[i - 1], ledger.position()) {
                (1, Position::Flat) => ledger.buy(i, price),
                (-1, Position::Long) => ledger.sell(i, price),
                _ => {}
            }
        }
        states.push(ledger.state(price));
    }

    Ok(finish(
        params.label(),
        states,
        start,
        initial_capital,
        initial_capital,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn signals_undefined_before_slow_window() {
        let signals = crossover_signals(&rising(30), &CrossoverParams::new(5, 20));
        assert!(signals[..19].iter().all(|&s| s == 0));
        assert!(signals[19..].iter().all(|&s| s == 1));
    }

    #[test]
    fn equal_averages_signal_zero() {
        let signals = crossover_signals(&[100.0; 30], &CrossoverParams::new(5, 20));
        assert!(signals.iter().all(|&s| s == 0));
    }

    #[test]
    fn rising_prices_never_sell() {
        let result = run_ma_crossover(&rising(60), &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 1);
        assert_eq!(result.states[20].position, Position::Long);
        assert!(result.states[20..]
            .iter()
            .all(|s| s.position == Position::Long));
        assert!(result.total_return > 0.0);
        assert_relative_eq!(result.ending_capital, 10_000.0 / 120.0 * 159.0);
    }

    #[test]
    fn constant_prices_stay_flat() {
        let result =
            run_ma_crossover(&[100.0; 60], &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 0);
        assert_eq!(result.ending_capital, 10_000.0);
        assert_eq!(result.total_return, 0.0);
    }

    #[test]
    fn falling_after_rising_sells() {
        let mut prices = rising(40);
        prices.extend((0..30).map(|i| 139.0 - 3.0 * i as f64));
        let result = run_ma_crossover(&prices, &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 2);
        assert_eq!(result.states.last().unwrap().position, Position::Flat);
    }

    fn rise_then_flat() -> Vec<f64> {
        let mut prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 1.37).collect();
        prices.extend(std::iter::repeat_n(157.31, 60));
        prices
    }

    #[test]
    fn flat_tail_after_rise_reads_zero() {
        let signals = crossover_signals(&rise_then_flat(), &CrossoverParams::new(5, 20));
        assert!(signals[19..59].iter().all(|&s| s == 1));
        assert!(signals[59..].iter().all(|&s| s == 0), "{:?}", &signals[59..]);
    }

    #[test]
    fn flat_tail_after_rise_holds_long() {
        let result =
            run_ma_crossover(&rise_then_flat(), &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 1);
        assert!(result.states[20..]
            .iter()
            .all(|s| s.position == Position::Long));
    }

    #[test]
    fn zero_signal_between_moves_keeps_position() {
        let mut prices = rise_then_flat();
        prices.extend((1..=30).map(|i| 157.31 + i as f64));
        let result = run_ma_crossover(&prices, &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 1);
        assert_eq!(result.states.last().unwrap().position, Position::Long);

        let mut falling: Vec<f64> = (0..40).map(|i| 200.0 - i as f64 * 1.37).collect();
        falling.extend(std::iter::repeat_n(146.57, 40));
        let result = run_ma_crossover(&falling, &CrossoverParams::new(5, 20), 10_000.0).unwrap();
        assert_eq!(result.num_trades, 0);
        assert_eq!(result.ending_capital, 10_000.0);
    }

    #[test]
    fn current_signal() {
        let params = CrossoverParams::new(5, 20);
        assert_eq!(crossover_signal(&rising(25), &params).unwrap(), TradeSignal::Buy);
        let falling: Vec<f64> = (0..25).map(|i| 200.0 - i as f64).collect();
        assert_eq!(crossover_signal(&falling, &params).unwrap(), TradeSignal::Sell);
        assert_eq!(crossover_signal(&[5.0; 25], &params).unwrap(), TradeSignal::Hold);
    }

    #[test]
    fn insufficient_history() {
        assert!(matches!(
            run_ma_crossover(&rising(50), &CrossoverParams::default(), 10_000.0),
            Err(ReversionError::InsufficientData {
                needed: 51,
                available: 50
            })
        ));
        assert!(matches!(
            crossover_signal(&rising(10), &CrossoverParams::new(5, 20)),
            Err(ReversionError::InsufficientData { .. })
        ));
    }

    #[test]
    fn zero_period_rejected() {
        assert!(matches!(
            run_ma_crossover(&rising(60), &CrossoverParams::new(0, 20), 10_000.0),
            Err(ReversionError::InvalidParameter { .. })
        ));
    }
}
