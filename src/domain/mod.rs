//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod crossover;
pub mod error;
pub mod historical;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod risk;
pub mod score;
pub mod series;
pub mod signal;
pub mod strategy;
