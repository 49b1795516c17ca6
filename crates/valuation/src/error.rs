use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error("Valuation parameters from configuration are invalid: {0}")]
    InvalidParameters(String),
}
