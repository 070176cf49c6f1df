//! Domain error types.

use crate::domain::allocation::AllocationError;

/// Top-level error type for portfolio_sim.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("invalid weight {weight} for {ticker}: must satisfy 0 < weight <= 1")]
    InvalidWeight { ticker: String, weight: f64 },

    #[error("invalid {field} '{value}' (expected YYYY-MM-DD)")]
    InvalidDateFormat { field: String, value: String },

    #[error("start date {start} is not before end date {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("no history for {ticker} on or before {date}")]
    DataGap { ticker: String, date: String },

    #[error("invalid history for {ticker}: {reason}")]
    InvalidHistory { ticker: String, reason: String },

    #[error("cannot rebalance {ticker} at a zero close on {date}")]
    ZeroClose { ticker: String, date: String },

    #[error("initial amount must be positive, got {amount}")]
    InvalidInitialAmount { amount: f64 },

    #[error("scenario has no securities")]
    NoSecurities,

    #[error("scenario has already been run")]
    AlreadyRun,

    #[error("failed to read history for {ticker}: {reason}")]
    HistoryRead { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortfolioError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PortfolioError::Io(_) => 1,
            PortfolioError::ConfigParse { .. }
            | PortfolioError::ConfigMissing { .. }
            | PortfolioError::ConfigInvalid { .. }
            | PortfolioError::Allocation(_) => 2,
            PortfolioError::HistoryRead { .. }
            | PortfolioError::InvalidHistory { .. }
            | PortfolioError::ZeroClose { .. } => 3,
            PortfolioError::InvalidWeight { .. }
            | PortfolioError::InvalidDateFormat { .. }
            | PortfolioError::InvalidDateRange { .. }
            | PortfolioError::DataGap { .. }
            | PortfolioError::InvalidInitialAmount { .. }
            | PortfolioError::NoSecurities
            | PortfolioError::AlreadyRun => 4,
        }
    }
}

impl From<&PortfolioError> for std::process::ExitCode {
    fn from(err: &PortfolioError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
