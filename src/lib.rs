//! reversion: mean-reversion indicators and backtests for crypto price history.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`service`] orchestrates a
//! fetch-compute-interpret pass for one token and [`cli`] is the front end.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod service;
