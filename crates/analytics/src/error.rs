use core_types::CoreError;
use thiserror::Error;
use valuation::ValuationError;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid dashboard selection: {0}")]
    Selection(#[from] CoreError),

    #[error("Valuation setup failed: {0}")]
    Valuation(#[from] ValuationError),
}
