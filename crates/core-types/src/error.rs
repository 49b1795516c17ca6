use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown period '{0}'")]
    UnknownPeriod(String),

    #[error("A portfolio needs at least one period dataset")]
    EmptyPortfolio,

    #[error("Period '{0}' is defined more than once")]
    DuplicatePeriod(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
