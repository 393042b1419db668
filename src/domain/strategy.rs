//! Strategy selection, side-by-side comparison and parameter sweeps.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::backtest::{run_mean_reversion, BacktestResult, MeanReversionParams};
use super::crossover::{run_ma_crossover, CrossoverParams};
use super::error::ReversionError;

pub const MA_FAST_GRID: [usize; 4] = [5, 10, 15, 20];
pub const MA_SLOW_GRID: [usize; 5] = [20, 30, 50, 100, 200];
pub const MR_LOOKBACK_GRID: [usize; 5] = [10, 15, 20, 25, 30];
pub const MR_THRESHOLD_GRID: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    MeanReversion,
    MaCrossover,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MeanReversion => write!(f, "mean-reversion"),
            StrategyKind::MaCrossover => write!(f, "ma-crossover"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ReversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean-reversion" | "mean_reversion" => Ok(StrategyKind::MeanReversion),
            "ma-crossover" | "ma_crossover" => Ok(StrategyKind::MaCrossover),
            other => Err(ReversionError::invalid(
                "strategy",
                format!("unknown strategy {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StrategyParams {
    MeanReversion(MeanReversionParams),
    MaCrossover(CrossoverParams),
}

impl StrategyParams {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::MeanReversion(_) => StrategyKind::MeanReversion,
            StrategyParams::MaCrossover(_) => StrategyKind::MaCrossover,
        }
    }
}

pub fn run_backtest(
    prices: &[f64],
    params: &StrategyParams,
    initial_capital: f64,
) -> Result<BacktestResult, ReversionError> {
    match params {
        StrategyParams::MeanReversion(p) => run_mean_reversion(prices, p, initial_capital),
        StrategyParams::MaCrossover(p) => run_ma_crossover(prices, p, initial_capital),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub name: String,
    pub total_return: f64,
    pub ending_capital: f64,
    pub num_trades: usize,
}

impl From<&BacktestResult> for StrategyOutcome {
    fn from(result: &BacktestResult) -> Self {
        StrategyOutcome {
            name: result.strategy.clone(),
            total_return: result.total_return,
            ending_capital: result.ending_capital,
            num_trades: result.num_trades,
        }
    }
}

/// Default mean reversion, MA crossover 5/20 and 10/50, and buy-and-hold,
/// best return first. Strategies lacking history are skipped.
///
/// Buy-and-hold is measured over the mean-reversion span when that strategy
/// ran, otherwise over the whole series.
pub fn compare_strategies(
    prices: &[f64],
    initial_capital: f64,
) -> Result<Vec<StrategyOutcome>, ReversionError> {
    let candidates = [
        StrategyParams::MeanReversion(MeanReversionParams::default()),
        StrategyParams::MaCrossover(CrossoverParams::new(5, 20)),
        StrategyParams::MaCrossover(CrossoverParams::new(10, 50)),
    ];

    let mut outcomes = Vec::new();
    let mut buy_hold_return = None;

    for params in &candidates {
        match run_backtest(prices, params, initial_capital) {
            Ok(result) => {
                if params.kind() == StrategyKind::MeanReversion {
                    buy_hold_return = Some(result.buy_hold_return);
                }
                outcomes.push(StrategyOutcome::from(&result));
            }
            Err(ReversionError::InsufficientData { needed, available }) => {
                tracing::debug!(?params, needed, available, "skipping strategy");
            }
            Err(e) => return Err(e),
        }
    }

    if outcomes.is_empty() {
        let needed = MeanReversionParams::default().lookback_period + 1;
        return Err(ReversionError::insufficient(needed, prices.len()));
    }

    let buy_hold_return = match buy_hold_return {
        Some(r) => r,
        None => whole_series_return(prices),
    };
    outcomes.push(StrategyOutcome {
        name: "Buy and Hold".to_string(),
        total_return: buy_hold_return,
        ending_capital: initial_capital * (1.0 + buy_hold_return / 100.0),
        num_trades: 1,
    });

    sort_by_return(&mut outcomes, |o| o.total_return);
    Ok(outcomes)
}

fn whole_series_return(prices: &[f64]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => (last / first - 1.0) * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationTrial {
    pub params: StrategyParams,
    pub total_return: f64,
    pub buy_hold_return: f64,
    pub num_trades: usize,
    pub ending_capital: f64,
}

pub fn strategy_grid(kind: StrategyKind) -> Vec<StrategyParams> {
    match kind {
        StrategyKind::MaCrossover => MA_FAST_GRID
            .iter()
            .flat_map(|&fast| {
                MA_SLOW_GRID
                    .iter()
                    .filter(move |&&slow| fast < slow)
                    .map(move |&slow| StrategyParams::MaCrossover(CrossoverParams::new(fast, slow)))
            })
            .collect(),
        StrategyKind::MeanReversion => MR_LOOKBACK_GRID
            .iter()
            .flat_map(|&lookback_period| {
                MR_THRESHOLD_GRID.iter().map(move |&z_threshold| {
                    StrategyParams::MeanReversion(MeanReversionParams {
                        lookback_period,
                        z_threshold,
                        ..MeanReversionParams::default()
                    })
                })
            })
            .collect(),
    }
}

/// Run every grid combination the history can support; best return first.
pub fn optimize(
    prices: &[f64],
    kind: StrategyKind,
    initial_capital: f64,
) -> Result<Vec<OptimizationTrial>, ReversionError> {
    let grid = strategy_grid(kind);
    let mut trials = Vec::with_capacity(grid.len());
    let mut smallest_need: Option<usize> = None;

    for params in grid {
        match run_backtest(prices, &params, initial_capital) {
            Ok(result) => trials.push(OptimizationTrial {
                total_return: result.total_return,
                buy_hold_return: result.buy_hold_return,
                num_trades: result.num_trades,
                ending_capital: result.ending_capital,
                params,
            }),
            Err(ReversionError::InsufficientData { needed, .. }) => {
                tracing::debug!(?params, needed, "skipping trial");
                smallest_need = Some(smallest_need.map_or(needed, |n| n.min(needed)));
            }
            Err(e) => return Err(e),
        }
    }

    if trials.is_empty() {
        return Err(ReversionError::insufficient(
            smallest_need.unwrap_or(1),
            prices.len(),
        ));
    }

    tracing::info!(%kind, trials = trials.len(), "optimization complete");
    sort_by_return(&mut trials, |t| t.total_return);
    Ok(trials)
}

fn sort_by_return<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}
