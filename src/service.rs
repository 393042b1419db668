//! Analysis service: fetch, compute, interpret and score tokens.
//!
//! The service owns a [`CachedPriceSource`] so repeated analyses of the same
//! token and span reuse one fetch, for spot prices and candles alike.

use serde::Serialize;

use crate::adapters::cached_adapter::CachedPriceSource;
use crate::domain::backtest::{BacktestResult, MeanReversionParams};
use crate::domain::crossover::{crossover_signal, CrossoverParams};
use crate::domain::error::ReversionError;
use crate::domain::historical::{historical_indicators, HistoricalRow};
use crate::domain::indicator::{compute_bundle, IndicatorBundle, IndicatorParams};
use crate::domain::risk::{risk_adjusted_score, AdjustedScore};
use crate::domain::score::{score_breakdown, ReversionDirection, ScoreBreakdown, ScoreWeights};
use crate::domain::series::PriceSeries;
use crate::domain::signal::{self, IndicatorSnapshot, OverallSignal, TradeSignal};
use crate::domain::strategy::{
    self, OptimizationTrial, StrategyKind, StrategyOutcome, StrategyParams,
};
use crate::ports::price_port::{PriceDataPort, DAILY_PERIOD};

/// Tunables for every analysis the service runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub indicators: IndicatorParams,
    pub mean_reversion: MeanReversionParams,
    pub crossover: CrossoverParams,
    pub weights: ScoreWeights,
    pub initial_capital: f64,
    pub days: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            indicators: IndicatorParams::default(),
            mean_reversion: MeanReversionParams::default(),
            crossover: CrossoverParams::default(),
            weights: ScoreWeights::default(),
            initial_capital: 10_000.0,
            days: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAnalysis {
    pub token: String,
    pub price: f64,
    pub data_points: usize,
    pub has_ohlc: bool,
    pub bundle: IndicatorBundle,
    pub overall: OverallSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReport {
    pub token: String,
    pub strategy: StrategyKind,
    pub price: f64,
    pub signal: TradeSignal,
    /// Indicator values behind a mean-reversion signal.
    pub snapshot: Option<IndicatorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegratedAnalysis {
    pub token: String,
    pub price: f64,
    pub snapshot: IndicatorSnapshot,
    pub breakdown: ScoreBreakdown,
    pub direction: ReversionDirection,
    pub risk: Option<AdjustedScore>,
}

impl IntegratedAnalysis {
    /// Risk-adjusted score when a risk score was supplied, the raw score otherwise.
    pub fn effective_score(&self) -> f64 {
        self.risk
            .as_ref()
            .map_or(self.breakdown.score, |r| r.adjusted_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedToken {
    pub token: String,
    pub reason: String,
}

/// Integrated analyses across several tokens, strongest signal first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub results: Vec<IntegratedAnalysis>,
    pub skipped: Vec<SkippedToken>,
}

pub struct AnalysisService<P> {
    source: CachedPriceSource<P>,
    settings: AnalysisSettings,
}

impl<P: PriceDataPort> AnalysisService<P> {
    pub fn new(source: P, settings: AnalysisSettings) -> Self {
        Self {
            source: CachedPriceSource::new(source),
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn source(&self) -> &CachedPriceSource<P> {
        &self.source
    }

    /// Closing prices over the last `days` days, through the cache.
    pub fn fetch_prices(&self, token: &str, days: usize) -> Result<Vec<f64>, ReversionError> {
        let series = self.source.get_historical_prices(token, days)?.into_series()?;
        tracing::debug!(token, days, points = series.len(), "fetched prices");
        Ok(series.closes())
    }

    /// OHLC candles when the source has them for `token`, spot prices otherwise.
    pub fn fetch_series(&self, token: &str, days: usize) -> Result<PriceSeries, ReversionError> {
        if self.source.supports_ohlc(token) {
            let candles = self.source.get_ohlc(token, DAILY_PERIOD, days)?;
            tracing::debug!(token, days, candles = candles.len(), "fetched candles");
            PriceSeries::ohlc(candles)
        } else {
            self.source.get_historical_prices(token, days)?.into_series()
        }
    }

    pub fn analyze(&self, token: &str, days: usize) -> Result<TokenAnalysis, ReversionError> {
        let series = self.fetch_series(token, days)?;
        let bundle = compute_bundle(&series, &self.settings.indicators)?;
        let overall = signal::interpret(&bundle);
        let price = last_price(&series)?;

        tracing::info!(token, %overall, z = bundle.z_score.value, rsi = bundle.rsi.value, "analysis complete");
        Ok(TokenAnalysis {
            token: token.to_string(),
            price,
            data_points: series.len(),
            has_ohlc: series.has_ohlc(),
            bundle,
            overall,
        })
    }

    pub fn history(
        &self,
        token: &str,
        window: usize,
        days: usize,
    ) -> Result<Vec<HistoricalRow>, ReversionError> {
        // Enough extra history that the first requested day is evaluable.
        let series = self.fetch_series(token, days + window)?;
        historical_indicators(&series, window, days)
    }

    /// Current mean-reversion signal from the trailing lookback window.
    pub fn trade_signal(&self, token: &str, days: usize) -> Result<SignalReport, ReversionError> {
        let params = &self.settings.mean_reversion;
        params.validate()?;
        let prices = self.fetch_prices(token, days)?;
        let snapshot = params.snapshot(&prices)?;
        let signal = signal::trade_signal(&snapshot, &params.rules());

        tracing::info!(token, %signal, "mean-reversion signal");
        Ok(SignalReport {
            token: token.to_string(),
            strategy: StrategyKind::MeanReversion,
            price: last(&prices)?,
            signal,
            snapshot: Some(snapshot),
        })
    }

    pub fn crossover_signal(
        &self,
        token: &str,
        days: usize,
    ) -> Result<SignalReport, ReversionError> {
        let prices = self.fetch_prices(token, days)?;
        let signal = crossover_signal(&prices, &self.settings.crossover)?;

        tracing::info!(token, %signal, "crossover signal");
        Ok(SignalReport {
            token: token.to_string(),
            strategy: StrategyKind::MaCrossover,
            price: last(&prices)?,
            signal,
            snapshot: None,
        })
    }

    /// Composite score, optionally scaled by an external risk score.
    pub fn integrated_analysis(
        &self,
        token: &str,
        days: usize,
        risk_score: Option<f64>,
    ) -> Result<IntegratedAnalysis, ReversionError> {
        let series = self.fetch_series(token, days)?;
        let bundle = compute_bundle(&series, &self.settings.indicators)?;
        let snapshot = bundle.snapshot();
        let breakdown = score_breakdown(&snapshot, &self.settings.weights);
        let direction = ReversionDirection::from_score(breakdown.score);
        let risk = risk_score.map(|r| risk_adjusted_score(breakdown.score, r));

        tracing::info!(token, score = breakdown.score, %direction, "integrated analysis");
        Ok(IntegratedAnalysis {
            token: token.to_string(),
            price: last_price(&series)?,
            snapshot,
            breakdown,
            direction,
            risk,
        })
    }

    /// Integrated analysis for each token. Tokens that fail are skipped and
    /// listed; the rest are ranked by the magnitude of their effective score.
    /// Fails only when no token could be analyzed.
    pub fn scan(
        &self,
        tokens: &[String],
        days: usize,
        risk_score: Option<f64>,
    ) -> Result<ScanReport, ReversionError> {
        if tokens.is_empty() {
            return Err(ReversionError::invalid("tokens", "at least one token is required"));
        }

        let mut results = Vec::with_capacity(tokens.len());
        let mut skipped = Vec::new();
        let mut first_error = None;
        for token in tokens {
            match self.integrated_analysis(token, days, risk_score) {
                Ok(analysis) => results.push(analysis),
                Err(e) => {
                    tracing::warn!(token = token.as_str(), error = %e, "skipping token");
                    skipped.push(SkippedToken {
                        token: token.clone(),
                        reason: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }
        if results.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        results.sort_by(|a, b| {
            b.effective_score()
                .abs()
                .total_cmp(&a.effective_score().abs())
                .then_with(|| a.token.cmp(&b.token))
        });
        tracing::info!(analyzed = results.len(), skipped = skipped.len(), "scan complete");
        Ok(ScanReport { results, skipped })
    }

    pub fn strategy_params(&self, kind: StrategyKind) -> StrategyParams {
        match kind {
            StrategyKind::MeanReversion => {
                StrategyParams::MeanReversion(self.settings.mean_reversion.clone())
            }
            StrategyKind::MaCrossover => StrategyParams::MaCrossover(self.settings.crossover.clone()),
        }
    }

    pub fn backtest(
        &self,
        token: &str,
        days: usize,
        kind: StrategyKind,
    ) -> Result<BacktestResult, ReversionError> {
        let prices = self.fetch_prices(token, days)?;
        strategy::run_backtest(
            &prices,
            &self.strategy_params(kind),
            self.settings.initial_capital,
        )
    }

    pub fn compare(&self, token: &str, days: usize) -> Result<Vec<StrategyOutcome>, ReversionError> {
        let prices = self.fetch_prices(token, days)?;
        strategy::compare_strategies(&prices, self.settings.initial_capital)
    }

    pub fn optimize(
        &self,
        token: &str,
        days: usize,
        kind: StrategyKind,
    ) -> Result<Vec<OptimizationTrial>, ReversionError> {
        let prices = self.fetch_prices(token, days)?;
        strategy::optimize(&prices, kind, self.settings.initial_capital)
    }
}

fn last_price(series: &PriceSeries) -> Result<f64, ReversionError> {
    series
        .last_price()
        .ok_or_else(|| ReversionError::insufficient(1, 0))
}

fn last(prices: &[f64]) -> Result<f64, ReversionError> {
    prices
        .last()
        .copied()
        .ok_or_else(|| ReversionError::insufficient(1, 0))
}
