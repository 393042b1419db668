//! Plain-text rendering of analyses, signals and backtests.
//!
//! The domain returns values and enums only; every human-readable label
//! lives here. [`TextReportAdapter`] also implements [`ReportPort`] to write a
//! backtest report to disk.

use std::fs;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ReversionError;
use crate::domain::historical::HistoricalRow;
use crate::domain::indicator::Interpretation;
use crate::domain::risk::AdjustedScore;
use crate::domain::signal::TradeSignal;
use crate::domain::strategy::{OptimizationTrial, StrategyKind, StrategyOutcome, StrategyParams};
use crate::ports::report_port::ReportPort;
use crate::service::{IntegratedAnalysis, ScanReport, SignalReport, TokenAnalysis};

pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn write_backtest(
        &self,
        token: &str,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), ReversionError> {
        fs::write(output_path, render_backtest(token, result))?;
        Ok(())
    }
}

fn z_score_label(state: Interpretation) -> &'static str {
    match state {
        Interpretation::Downward => "POTENTIAL DOWNWARD REVERSION (Overvalued)",
        Interpretation::Upward => "POTENTIAL UPWARD REVERSION (Undervalued)",
        Interpretation::Neutral => "NEUTRAL",
    }
}

fn rsi_label(state: Interpretation) -> &'static str {
    match state {
        Interpretation::Downward => "POTENTIAL DOWNWARD REVERSION (Overbought)",
        Interpretation::Upward => "POTENTIAL UPWARD REVERSION (Oversold)",
        Interpretation::Neutral => "NEUTRAL",
    }
}

fn bollinger_label(state: Interpretation) -> &'static str {
    match state {
        Interpretation::Downward => "POTENTIAL DOWNWARD REVERSION (Above Upper Band)",
        Interpretation::Upward => "POTENTIAL UPWARD REVERSION (Below Lower Band)",
        Interpretation::Neutral => "NEUTRAL (Within Bands)",
    }
}

fn macd_label(state: Interpretation) -> &'static str {
    match state {
        Interpretation::Upward => "BULLISH (MACD above signal line)",
        _ => "BEARISH (MACD below signal line)",
    }
}

pub fn overall_label(state: Interpretation) -> &'static str {
    match state {
        Interpretation::Upward => "POTENTIAL UPWARD REVERSION",
        Interpretation::Downward => "POTENTIAL DOWNWARD REVERSION",
        Interpretation::Neutral => "NEUTRAL",
    }
}

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

fn describe_params(params: &StrategyParams) -> String {
    match params {
        StrategyParams::MeanReversion(p) => {
            format!("lookback={} z={:.1}", p.lookback_period, p.z_threshold)
        }
        StrategyParams::MaCrossover(p) => format!("fast={} slow={}", p.fast_period, p.slow_period),
    }
}

pub fn render_analysis(analysis: &TokenAnalysis) -> String {
    let b = &analysis.bundle;
    let mut output = format!(
        "=== MEAN REVERSION ANALYSIS FOR {} ===\n",
        analysis.token.to_uppercase()
    );
    output.push_str(&format!("Current Price: {}\n", fmt_currency(analysis.price)));
    output.push_str(&format!("Data Points: {}\n\n", analysis.data_points));

    output.push_str(&format!(
        "Z-Score ({}-day): {:.2}\n  {}\n",
        b.z_score.window,
        b.z_score.value,
        z_score_label(b.z_score.interpretation)
    ));
    output.push_str(&format!(
        "RSI ({}-day): {:.2}\n  {}\n",
        b.rsi.window,
        b.rsi.value,
        rsi_label(b.rsi.interpretation)
    ));
    output.push_str(&format!(
        "Bollinger Bands ({}-day, {:.1} std):\n  Upper: {:.4}  Middle: {:.4}  Lower: {:.4}\n  %B: {:.2}\n  {}\n",
        b.bollinger.window,
        b.bollinger.num_std,
        b.bollinger.bands.upper,
        b.bollinger.bands.middle,
        b.bollinger.bands.lower,
        b.bollinger.bands.percent_b,
        bollinger_label(b.bollinger.interpretation)
    ));
    if let Some(atr) = &b.atr {
        output.push_str(&format!("ATR ({}-day): {:.4}\n", atr.window, atr.value));
    }
    if let Some(m) = &b.macd {
        output.push_str(&format!(
            "MACD ({}/{}/{}): line {:.4}, signal {:.4}, histogram {:.4}\n  {}\n",
            m.fast,
            m.slow,
            m.signal,
            m.macd.macd_line,
            m.macd.signal_line,
            m.macd.histogram,
            macd_label(m.interpretation)
        ));
    }
    output.push_str(&format!(
        "\nOVERALL SIGNAL: {}\n",
        overall_label(analysis.overall)
    ));
    output
}

pub fn render_signal(report: &SignalReport) -> String {
    let title = match report.strategy {
        StrategyKind::MeanReversion => "MEAN REVERSION TRADING SIGNAL",
        StrategyKind::MaCrossover => "MA CROSSOVER TRADING SIGNAL",
    };
    let mut output = format!("=== {} FOR {} ===\n", title, report.token.to_uppercase());
    output.push_str(&format!("Current Price: {}\n", fmt_currency(report.price)));
    output.push_str(&format!("Signal: {}\n", report.signal));
    if let Some(s) = &report.snapshot {
        output.push_str(&format!(
            "Z-Score: {:.2}\nRSI: {:.2}\n%B: {:.2}\n",
            s.z_score, s.rsi, s.percent_b
        ));
    }
    let reasoning = match (report.strategy, report.signal) {
        (StrategyKind::MeanReversion, TradeSignal::Buy) => {
            "Price is significantly below its recent average; a reversion upward is expected."
        }
        (StrategyKind::MeanReversion, TradeSignal::Sell) => {
            "Price is significantly above its recent average; a reversion downward is expected."
        }
        (StrategyKind::MaCrossover, TradeSignal::Buy) => {
            "Fast moving average is above the slow moving average (bullish trend)."
        }
        (StrategyKind::MaCrossover, TradeSignal::Sell) => {
            "Fast moving average is below the slow moving average (bearish trend)."
        }
        (_, TradeSignal::Hold) => "No strong signal; hold the current position.",
    };
    output.push_str(&format!("\n{reasoning}\n"));
    output
}

fn render_risk(risk: &AdjustedScore) -> String {
    format!(
        "WHALE RISK ADJUSTMENT:\n  Risk Score: {:.2} ({})\n  Multiplier: {:.1}x\n  {}\n  Adjusted Score: {:.2} -> {:.2}{}\n",
        risk.risk_score,
        risk.band,
        risk.multiplier,
        risk.explanation,
        risk.original_value,
        risk.adjusted_value,
        if risk.strength_increased() {
            " (signal strength increased)"
        } else {
            ""
        }
    )
}

pub fn render_integrated(analysis: &IntegratedAnalysis) -> String {
    let mut output = format!(
        "=== INTEGRATED ANALYSIS FOR {} ===\n",
        analysis.token.to_uppercase()
    );
    output.push_str(&format!("Current Price: {}\n\n", fmt_currency(analysis.price)));
    output.push_str("MEAN REVERSION:\n");
    output.push_str(&format!(
        "  Z-Score: {:.2} (component {:+.2})\n  RSI: {:.2} (component {:+.2})\n  %B: {:.2} (component {:+.2})\n",
        analysis.snapshot.z_score,
        analysis.breakdown.z_component,
        analysis.snapshot.rsi,
        analysis.breakdown.rsi_component,
        analysis.snapshot.percent_b,
        analysis.breakdown.percent_b_component
    ));
    output.push_str(&format!(
        "  Score: {:.2} / 10\n  {}\n\n",
        analysis.breakdown.score, analysis.direction
    ));
    if let Some(risk) = &analysis.risk {
        output.push_str(&render_risk(risk));
    }
    output
}

pub fn render_scan(report: &ScanReport) -> String {
    let mut output = String::from("=== MULTI-TOKEN INTEGRATED ANALYSIS ===\n");
    output.push_str(&format!(
        "{:<10} {:>12} {:>9} {:>6} {:>6} {:>9}  {}\n",
        "Token", "Price", "MR Score", "Risk", "Mult", "Adj Score", "Signal"
    ));
    output.push_str(&format!("{}\n", "-".repeat(90)));
    for r in &report.results {
        let (risk, multiplier) = match &r.risk {
            Some(adj) => (format!("{:.1}", adj.risk_score), format!("{:.1}x", adj.multiplier)),
            None => ("-".to_string(), "-".to_string()),
        };
        output.push_str(&format!(
            "{:<10} {:>12} {:>9.2} {:>6} {:>6} {:>9.2}  {}\n",
            r.token.to_uppercase(),
            fmt_currency(r.price),
            r.breakdown.score,
            risk,
            multiplier,
            r.effective_score(),
            r.direction
        ));
    }
    if !report.skipped.is_empty() {
        output.push_str("\nSkipped:\n");
        for s in &report.skipped {
            output.push_str(&format!("  {}: {}\n", s.token.to_uppercase(), s.reason));
        }
    }
    output
}

pub fn render_backtest(token: &str, result: &BacktestResult) -> String {
    let s = &result.summary;
    let mut output = format!(
        "=== {} BACKTEST RESULTS FOR {} ===\n",
        result.strategy.to_uppercase(),
        token.to_uppercase()
    );
    output.push_str(&format!(
        "Initial Capital: {}\n",
        fmt_currency(result.initial_capital)
    ));
    output.push_str(&format!(
        "Final Capital: {}\n",
        fmt_currency(result.ending_capital)
    ));
    output.push_str(&format!("Strategy Return: {:.2}%\n", result.total_return));
    output.push_str(&format!("Buy & Hold Return: {:.2}%\n", result.buy_hold_return));
    output.push_str(&format!("Number of Trades: {}\n", result.num_trades));
    output.push_str(&format!("Max Drawdown: -{:.1}%\n", s.max_drawdown * 100.0));
    output.push_str(&format!(
        "Max Drawdown Duration: {} days\n",
        s.max_drawdown_duration
    ));
    output.push_str(&format!("Exposure: {:.1}%\n", s.exposure * 100.0));
    output.push_str(&format!(
        "\nThe strategy {} buy-and-hold by {:.2} percentage points.\n",
        if s.outperformed {
            "OUTPERFORMED"
        } else {
            "UNDERPERFORMED"
        },
        s.excess_return.abs()
    ));
    output
}

pub fn render_comparison(
    token: &str,
    days: usize,
    initial_capital: f64,
    outcomes: &[StrategyOutcome],
) -> String {
    let mut output = format!(
        "=== TRADING STRATEGY COMPARISON FOR {} ===\n",
        token.to_uppercase()
    );
    output.push_str(&format!("Time Period: Last {days} days\n"));
    output.push_str(&format!(
        "Initial Capital: {}\n\nPERFORMANCE RANKING:\n",
        fmt_currency(initial_capital)
    ));
    for (i, o) in outcomes.iter().enumerate() {
        output.push_str(&format!(
            "{}. {:20} | Return: {:6.2}% | Ending Capital: {:>10} | Trades: {}\n",
            i + 1,
            o.name,
            o.total_return,
            fmt_currency(o.ending_capital),
            o.num_trades
        ));
    }
    if let (Some(best), Some(worst)) = (outcomes.first(), outcomes.last()) {
        output.push_str(&format!(
            "\nBest performing strategy: {} with {:.2}% return\n",
            best.name, best.total_return
        ));
        output.push_str(&format!(
            "Worst performing strategy: {} with {:.2}% return\n",
            worst.name, worst.total_return
        ));
    }
    output
}

pub fn render_optimization(token: &str, kind: StrategyKind, trials: &[OptimizationTrial]) -> String {
    let mut output = format!(
        "=== {} PARAMETER OPTIMIZATION FOR {} ===\n",
        kind.to_string().to_uppercase(),
        token.to_uppercase()
    );
    output.push_str(&format!("Combinations tested: {}\n\n", trials.len()));
    for (i, t) in trials.iter().take(5).enumerate() {
        output.push_str(&format!(
            "{}. {:24} | Return: {:6.2}% | Buy & Hold: {:6.2}% | Trades: {}\n",
            i + 1,
            describe_params(&t.params),
            t.total_return,
            t.buy_hold_return,
            t.num_trades
        ));
    }
    if let Some(best) = trials.first() {
        output.push_str(&format!(
            "\nOptimal parameters: {}\n",
            describe_params(&best.params)
        ));
    }
    output
}

pub fn render_history(token: &str, rows: &[HistoricalRow]) -> String {
    let mut output = format!("=== INDICATOR HISTORY FOR {} ===\n", token.to_uppercase());
    output.push_str("date       |      price |  z-score |    rsi |   %B | signal\n");
    for row in rows {
        output.push_str(&format!(
            "{} | {:>10.4} | {:>8.2} | {:>6.2} | {:>4.2} | {}",
            row.timestamp.format("%Y-%m-%d"),
            row.price,
            row.z_score,
            row.rsi,
            row.bands.percent_b,
            row.signal
        ));
        if let Some(atr) = row.atr {
            output.push_str(&format!(" | atr {atr:.4}"));
        }
        if let Some(m) = &row.macd {
            output.push_str(&format!(" | macd {:.4}", m.histogram));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{run_mean_reversion, MeanReversionParams};
    use crate::domain::indicator::compute_indicators;
    use crate::domain::risk::apply_risk_multiplier;
    use crate::domain::score::{score_breakdown, ReversionDirection, ScoreWeights};
    use crate::domain::signal::{self, IndicatorSnapshot};
    use crate::service::SkippedToken;

    fn sample_backtest() -> BacktestResult {
        let mut prices = vec![100.0; 19];
        prices.push(50.0);
        run_mean_reversion(&prices, &MeanReversionParams::default(), 10_000.0).unwrap()
    }

    #[test]
    fn analysis_uses_interpretation_labels() {
        let mut prices = vec![100.0; 19];
        prices.push(50.0);
        let bundle = compute_indicators(&prices, 10, 2.0).unwrap();
        let analysis = TokenAnalysis {
            token: "bitcoin".into(),
            price: 50.0,
            data_points: 20,
            has_ohlc: false,
            overall: signal::interpret(&bundle),
            bundle,
        };
        let text = render_analysis(&analysis);
        assert!(text.contains("FOR BITCOIN"));
        assert!(text.contains("POTENTIAL UPWARD REVERSION (Undervalued)"));
        assert!(text.contains("OVERALL SIGNAL: POTENTIAL UPWARD REVERSION"));
        assert!(!text.contains("ATR"));
    }

    #[test]
    fn signal_report_lists_snapshot() {
        let report = SignalReport {
            token: "eth".into(),
            strategy: StrategyKind::MeanReversion,
            price: 2000.0,
            signal: TradeSignal::Buy,
            snapshot: Some(IndicatorSnapshot {
                z_score: -2.5,
                rsi: 25.0,
                percent_b: -0.1,
            }),
        };
        let text = render_signal(&report);
        assert!(text.contains("Signal: BUY"));
        assert!(text.contains("Z-Score: -2.50"));
        assert!(text.contains("below its recent average"));
    }

    #[test]
    fn integrated_includes_risk_adjustment() {
        let snapshot = IndicatorSnapshot {
            z_score: -2.0,
            rsi: 50.0,
            percent_b: 0.5,
        };
        let breakdown = score_breakdown(&snapshot, &ScoreWeights::default());
        let analysis = IntegratedAnalysis {
            token: "sol".into(),
            price: 10.0,
            snapshot,
            breakdown,
            direction: ReversionDirection::from_score(breakdown.score),
            risk: Some(apply_risk_multiplier(breakdown.score, 6.0)),
        };
        let text = render_integrated(&analysis);
        assert!(text.contains("MODERATE UPWARD REVERSION POTENTIAL"));
        assert!(text.contains("doubling signal strength"));
        assert!(text.contains("signal strength increased"));
    }

    #[test]
    fn scan_lists_ranked_rows_and_skips() {
        let snapshot = IndicatorSnapshot {
            z_score: -2.0,
            rsi: 50.0,
            percent_b: 0.5,
        };
        let breakdown = score_breakdown(&snapshot, &ScoreWeights::default());
        let report = ScanReport {
            results: vec![IntegratedAnalysis {
                token: "sol".into(),
                price: 10.0,
                snapshot,
                breakdown,
                direction: ReversionDirection::from_score(breakdown.score),
                risk: Some(apply_risk_multiplier(breakdown.score, 6.0)),
            }],
            skipped: vec![SkippedToken {
                token: "doge".into(),
                reason: "network error: timeout".into(),
            }],
        };
        let text = render_scan(&report);
        assert!(text.contains("MULTI-TOKEN INTEGRATED ANALYSIS"));
        assert!(text.contains("SOL"));
        assert!(text.contains("2.0x"));
        assert!(text.contains("DOGE: network error: timeout"));
    }

    #[test]
    fn backtest_report_summarizes() {
        let text = render_backtest("bitcoin", &sample_backtest());
        assert!(text.contains("MEAN REVERSION BACKTEST RESULTS FOR BITCOIN"));
        assert!(text.contains("Initial Capital: $10000.00"));
        assert!(text.contains("Number of Trades: 1"));
    }

    #[test]
    fn comparison_ranks_strategies() {
        let outcomes = vec![
            StrategyOutcome {
                name: "Buy and Hold".into(),
                total_return: 12.5,
                ending_capital: 11_250.0,
                num_trades: 1,
            },
            StrategyOutcome {
                name: "Mean Reversion".into(),
                total_return: -3.0,
                ending_capital: 9_700.0,
                num_trades: 4,
            },
        ];
        let text = render_comparison("btc", 365, 10_000.0, &outcomes);
        assert!(text.contains("1. Buy and Hold"));
        assert!(text.contains("2. Mean Reversion"));
        assert!(text.contains("Best performing strategy: Buy and Hold"));
    }

    #[test]
    fn write_backtest_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        TextReportAdapter
            .write_backtest("bitcoin", &sample_backtest(), path.to_str().unwrap())
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("BACKTEST RESULTS"));
    }

    #[test]
    fn write_backtest_to_missing_dir_is_io_error() {
        let result = TextReportAdapter.write_backtest(
            "bitcoin",
            &sample_backtest(),
            "/nonexistent/dir/report.txt",
        );
        assert!(matches!(result, Err(ReversionError::Io(_))));
    }
}
