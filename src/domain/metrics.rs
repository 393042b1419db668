//! Performance summary of a backtest run over its evaluated days.

use serde::Serialize;

use super::backtest::{BacktestState, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Largest peak-to-trough decline as a fraction of the running peak.
    pub max_drawdown: f64,
    /// Longest run of days spent below a previous peak.
    pub max_drawdown_duration: i64,
    /// Fraction of evaluated days spent LONG.
    pub exposure: f64,
    /// total_return - buy_hold_return, in percentage points.
    pub excess_return: f64,
    pub outperformed: bool,
}

impl PerformanceSummary {
    pub fn compute(states: &[BacktestState], total_return: f64, buy_hold_return: f64) -> Self {
        let equity: Vec<f64> = states.iter().map(|s| s.portfolio_value).collect();
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&equity);

        let exposure = if states.is_empty() {
            0.0
        } else {
            let long_days = states
                .iter()
                .filter(|s| s.position == Position::Long)
                .count();
            long_days as f64 / states.len() as f64
        };

        let excess_return = total_return - buy_hold_return;

        PerformanceSummary {
            max_drawdown,
            max_drawdown_duration,
            exposure,
            excess_return,
            outperformed: excess_return > 0.0,
        }
    }
}

fn compute_drawdown(equity_curve: &[f64]) -> (f64, i64) {
    let Some(&first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for &equity in equity_curve {
        if equity >= peak {
            peak = equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}
