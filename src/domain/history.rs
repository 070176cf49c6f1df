//! Security price/dividend/distribution history.

use crate::domain::error::PortfolioError;
use chrono::NaiveDate;

/// One trading date of a security's history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub dividend: f64,
    pub capital_gain_distribution: f64,
}

impl HistoryRecord {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            dividend: 0.0,
            capital_gain_distribution: 0.0,
        }
    }

    /// Per-share cash paid on this date (dividend + capital gain distribution).
    pub fn cash_per_share(&self) -> f64 {
        self.dividend + self.capital_gain_distribution
    }
}

/// A ticker and its history, ascending by date with no duplicate dates.
///
/// Immutable once built; scenarios share it through `Arc<Security>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    ticker: String,
    history: Vec<HistoryRecord>,
}

impl Security {
    pub fn new(ticker: impl Into<String>, history: Vec<HistoryRecord>) -> Result<Self, PortfolioError> {
        let ticker = ticker.into();
        if ticker.trim().is_empty() {
            return Err(PortfolioError::InvalidHistory {
                ticker,
                reason: "ticker must not be empty".into(),
            });
        }

        if let Some(w) = history.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(PortfolioError::InvalidHistory {
                reason: format!(
                    "records not strictly ascending at {} -> {}",
                    w[0].date, w[1].date
                ),
                ticker,
            });
        }

        if let Some(r) = history.iter().find(|r| !r.close.is_finite() || r.close < 0.0) {
            return Err(PortfolioError::InvalidHistory {
                reason: format!("close {} on {} must be a non-negative number", r.close, r.date),
                ticker,
            });
        }
        if let Some(r) = history.iter().find(|r| !r.cash_per_share().is_finite()) {
            return Err(PortfolioError::InvalidHistory {
                reason: format!("non-finite dividend or distribution on {}", r.date),
                ticker,
            });
        }

        Ok(Self { ticker, history })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.history.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.history.last().map(|r| r.date)
    }
}
