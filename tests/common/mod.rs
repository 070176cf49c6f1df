#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use portfolio_sim::domain::error::PortfolioError;
pub use portfolio_sim::domain::history::{HistoryRecord, Security};
use portfolio_sim::ports::history_port::HistoryPort;
use std::collections::HashMap;
use std::sync::Arc;

pub struct MockHistoryPort {
    pub data: HashMap<String, Vec<HistoryRecord>>,
    pub errors: HashMap<String, String>,
}

impl MockHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_records(mut self, ticker: &str, records: Vec<HistoryRecord>) -> Self {
        self.data.insert(ticker.to_string(), records);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl HistoryPort for MockHistoryPort {
    fn load_security(&self, ticker: &str) -> Result<Security, PortfolioError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(PortfolioError::HistoryRead {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let records = self.data.get(ticker).cloned().ok_or_else(|| PortfolioError::HistoryRead {
            ticker: ticker.to_string(),
            reason: "no such ticker".to_string(),
        })?;
        Security::new(ticker, records)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_record(date: &str, close: f64) -> HistoryRecord {
    HistoryRecord::new(parse_date(date), close)
}

pub fn make_security(ticker: &str, records: Vec<HistoryRecord>) -> Arc<Security> {
    Arc::new(Security::new(ticker, records).unwrap())
}

/// One record per calendar day from `start` through `end`, close from `price`.
pub fn daily_records(start: NaiveDate, end: NaiveDate, price: impl Fn(usize) -> f64) -> Vec<HistoryRecord> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .enumerate()
        .map(|(i, d)| HistoryRecord::new(d, price(i)))
        .collect()
}

/// Like [`daily_records`] but skipping Saturdays and Sundays.
pub fn weekday_records(start: NaiveDate, end: NaiveDate, price: impl Fn(usize) -> f64) -> Vec<HistoryRecord> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .enumerate()
        .map(|(i, d)| HistoryRecord::new(d, price(i)))
        .collect()
}
