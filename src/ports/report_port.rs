//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ReversionError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write_backtest(
        &self,
        token: &str,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), ReversionError>;
}
