//! Security history access port trait.

use crate::domain::error::PortfolioError;
use crate::domain::history::Security;
use chrono::NaiveDate;

pub trait HistoryPort {
    /// Load the full history of `ticker`, ascending by date.
    fn load_security(&self, ticker: &str) -> Result<Security, PortfolioError>;

    /// First date, last date and record count, or `None` for an empty history.
    fn data_range(&self, ticker: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PortfolioError> {
        let security = self.load_security(ticker)?;
        Ok(security
            .first_date()
            .zip(security.last_date())
            .map(|(first, last)| (first, last, security.len())))
    }
}
