//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::{self, TextReportAdapter};
use crate::domain::backtest::MeanReversionParams;
use crate::domain::config_validation::validate_config;
use crate::domain::crossover::CrossoverParams;
use crate::domain::error::ReversionError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::score::ScoreWeights;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::service::{AnalysisService, AnalysisSettings};

#[derive(Parser, Debug)]
#[command(
    name = "reversion",
    about = "Mean-reversion indicators, signals and backtests for crypto price history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(short, long)]
    pub token: String,
    /// Days of history; defaults to [backtest] days
    #[arg(short, long)]
    pub days: Option<usize>,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute Z-score, RSI, Bollinger Bands (plus ATR and MACD for OHLC data)
    Indicators {
        #[command(flatten)]
        args: TokenArgs,
    },
    /// Current BUY/SELL/HOLD signal
    Signal {
        #[command(flatten)]
        args: TokenArgs,
        #[arg(long, default_value = "mean-reversion")]
        strategy: StrategyKind,
    },
    /// Composite mean-reversion score, optionally risk-adjusted
    Score {
        #[command(flatten)]
        args: TokenArgs,
        #[arg(long)]
        risk_score: Option<f64>,
    },
    /// Run a backtest
    Backtest {
        #[command(flatten)]
        args: TokenArgs,
        #[arg(long, default_value = "mean-reversion")]
        strategy: StrategyKind,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare strategies against buy-and-hold
    Compare {
        #[command(flatten)]
        args: TokenArgs,
    },
    /// Sweep strategy parameters
    Optimize {
        #[command(flatten)]
        args: TokenArgs,
        #[arg(long, default_value = "ma-crossover")]
        strategy: StrategyKind,
    },
    /// Per-day indicator history
    History {
        #[command(flatten)]
        args: TokenArgs,
        /// Indicator window; defaults to [indicators] z_window
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Integrated analysis across several tokens, strongest signal first
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Token to include; repeat for each token
        #[arg(short = 't', long = "token", required = true)]
        tokens: Vec<String>,
        #[arg(short, long)]
        days: Option<usize>,
        #[arg(long)]
        risk_score: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), ReversionError> {
    match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Indicators { args } => {
            let (service, days) = open_service(&args.config, args.days)?;
            let analysis = service.analyze(&args.token, days)?;
            emit(args.json, &analysis, || text_report::render_analysis(&analysis))
        }
        Command::Signal { args, strategy } => {
            let (service, days) = open_service(&args.config, args.days)?;
            let report = match strategy {
                StrategyKind::MeanReversion => service.trade_signal(&args.token, days)?,
                StrategyKind::MaCrossover => service.crossover_signal(&args.token, days)?,
            };
            emit(args.json, &report, || text_report::render_signal(&report))
        }
        Command::Score { args, risk_score } => {
            let (service, days) = open_service(&args.config, args.days)?;
            let analysis = service.integrated_analysis(&args.token, days, risk_score)?;
            emit(args.json, &analysis, || {
                text_report::render_integrated(&analysis)
            })
        }
        Command::Scan {
            config,
            tokens,
            days,
            risk_score,
            json,
        } => {
            let (service, days) = open_service(&config, days)?;
            let report = service.scan(&tokens, days, risk_score)?;
            emit(json, &report, || text_report::render_scan(&report))
        }
        Command::Backtest {
            args,
            strategy,
            output,
        } => {
            let (service, days) = open_service(&args.config, args.days)?;
            eprintln!("Running {strategy} backtest for {} over {days} days", args.token);
            let result = service.backtest(&args.token, days, strategy)?;
            if let Some(path) = output {
                TextReportAdapter.write_backtest(&args.token, &result, &path.to_string_lossy())?;
                eprintln!("Report written to: {}", path.display());
            }
            emit(args.json, &result, || {
                text_report::render_backtest(&args.token, &result)
            })
        }
        Command::Compare { args } => {
            let (service, days) = open_service(&args.config, args.days)?;
            let outcomes = service.compare(&args.token, days)?;
            let capital = service.settings().initial_capital;
            emit(args.json, &outcomes, || {
                text_report::render_comparison(&args.token, days, capital, &outcomes)
            })
        }
        Command::Optimize { args, strategy } => {
            let (service, days) = open_service(&args.config, args.days)?;
            eprintln!("Optimizing {strategy} parameters for {}", args.token);
            let trials = service.optimize(&args.token, days, strategy)?;
            emit(args.json, &trials, || {
                text_report::render_optimization(&args.token, strategy, &trials)
            })
        }
        Command::History { args, window } => {
            let (service, days) = open_service(&args.config, args.days)?;
            let window = window.unwrap_or(service.settings().indicators.z_window);
            let rows = service.history(&args.token, window, days)?;
            emit(args.json, &rows, || {
                text_report::render_history(&args.token, &rows)
            })
        }
    }
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    render: impl FnOnce() -> String,
) -> Result<(), ReversionError> {
    if json {
        let out = serde_json::to_string_pretty(value).map_err(|e| ReversionError::Data {
            reason: format!("failed to serialize output: {e}"),
        })?;
        println!("{out}");
    } else {
        print!("{}", render());
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ReversionError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn open_service(
    config_path: &Path,
    days: Option<usize>,
) -> Result<(AnalysisService<CsvPriceAdapter>, usize), ReversionError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let settings = build_settings(&config)?;
    let source = build_price_source(&config)?;
    let days = days.unwrap_or(settings.days);
    if days == 0 {
        return Err(ReversionError::invalid("days", "must be at least 1"));
    }
    Ok((AnalysisService::new(source, settings), days))
}

pub fn build_price_source(config: &dyn ConfigPort) -> Result<CsvPriceAdapter, ReversionError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "csv".to_string());
    if provider != "csv" {
        return Err(ReversionError::ConfigInvalid {
            section: "data".into(),
            key: "provider".into(),
            reason: format!("unknown provider {provider:?}"),
        });
    }
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| ReversionError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvPriceAdapter::new(PathBuf::from(path)))
}

fn get_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ReversionError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| ReversionError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{key} must be non-negative, got {value}"),
    })
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<AnalysisSettings, ReversionError> {
    let ind = IndicatorParams::default();
    let indicators = IndicatorParams {
        z_window: get_usize(config, "indicators", "z_window", ind.z_window)?,
        rsi_window: get_usize(config, "indicators", "rsi_window", ind.rsi_window)?,
        bb_window: get_usize(config, "indicators", "bb_window", ind.bb_window)?,
        num_std: config.get_double("indicators", "num_std", ind.num_std),
        atr_window: get_usize(config, "indicators", "atr_window", ind.atr_window)?,
        macd_fast: get_usize(config, "indicators", "macd_fast", ind.macd_fast)?,
        macd_slow: get_usize(config, "indicators", "macd_slow", ind.macd_slow)?,
        macd_signal: get_usize(config, "indicators", "macd_signal", ind.macd_signal)?,
    };

    let mr = MeanReversionParams::default();
    let mean_reversion = MeanReversionParams {
        lookback_period: get_usize(config, "mean_reversion", "lookback_period", mr.lookback_period)?,
        z_threshold: config.get_double("mean_reversion", "z_threshold", mr.z_threshold),
        rsi_oversold: config.get_double("mean_reversion", "rsi_oversold", mr.rsi_oversold),
        rsi_overbought: config.get_double("mean_reversion", "rsi_overbought", mr.rsi_overbought),
        rsi_window: get_usize(config, "mean_reversion", "rsi_window", mr.rsi_window)?,
        num_std: config.get_double("mean_reversion", "num_std", mr.num_std),
    };

    let co = CrossoverParams::default();
    let crossover = CrossoverParams {
        fast_period: get_usize(config, "crossover", "fast_period", co.fast_period)?,
        slow_period: get_usize(config, "crossover", "slow_period", co.slow_period)?,
    };

    let w = ScoreWeights::default();
    let weights = ScoreWeights {
        z_multiplier: config.get_double("score", "z_multiplier", w.z_multiplier),
        z_cap: config.get_double("score", "z_cap", w.z_cap),
        rsi_cap: config.get_double("score", "rsi_cap", w.rsi_cap),
        percent_b_cap: config.get_double("score", "percent_b_cap", w.percent_b_cap),
    };

    let defaults = AnalysisSettings::default();
    Ok(AnalysisSettings {
        indicators,
        mean_reversion,
        crossover,
        weights,
        initial_capital: config.get_double("backtest", "initial_capital", defaults.initial_capital),
        days: get_usize(config, "backtest", "days", defaults.days)?,
    })
}

fn run_validate(config_path: &Path) -> Result<(), ReversionError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let settings = build_settings(&config)?;
    eprintln!("Config validated successfully");

    let ind = &settings.indicators;
    let mr = &settings.mean_reversion;
    eprintln!(
        "\nIndicators: z={} rsi={} bollinger={}x{:.1} atr={} macd={}/{}/{}",
        ind.z_window,
        ind.rsi_window,
        ind.bb_window,
        ind.num_std,
        ind.atr_window,
        ind.macd_fast,
        ind.macd_slow,
        ind.macd_signal
    );
    eprintln!(
        "Mean reversion: lookback={} z={:.1} rsi {}..{} over {}",
        mr.lookback_period, mr.z_threshold, mr.rsi_oversold, mr.rsi_overbought, mr.rsi_window
    );
    eprintln!(
        "MA crossover: {}/{}",
        settings.crossover.fast_period, settings.crossover.slow_period
    );
    eprintln!(
        "Backtest: capital {:.2} over {} days",
        settings.initial_capital, settings.days
    );
    Ok(())
}
