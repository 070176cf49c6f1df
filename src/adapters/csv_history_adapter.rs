//! CSV file history adapter.
//!
//! For ticker `T` the data directory holds:
//! - `T.csv`: daily closes, `Date` in column 0 and `Close` in column 4
//! - `T_div.csv`: dividends, `Date` in column 0 and `Dividends` in column 1
//! - `T_distr.csv`: capital gain distributions, `Date` in column 0 and
//!   `Distributions` in column 1
//!
//! The dividend and distribution files are optional.

use crate::domain::error::PortfolioError;
use crate::domain::history::{HistoryRecord, Security};
use crate::ports::history_port::HistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DATE_COLUMN: usize = 0;
const CLOSE_COLUMN: usize = 4;
const AMOUNT_COLUMN: usize = 1;

#[derive(Debug, Clone, Copy)]
enum CashKind {
    Dividend,
    Distribution,
}

impl CashKind {
    fn suffix(self) -> &'static str {
        match self {
            CashKind::Dividend => "_div",
            CashKind::Distribution => "_distr",
        }
    }

    fn header(self) -> &'static str {
        match self {
            CashKind::Dividend => "Dividends",
            CashKind::Distribution => "Distributions",
        }
    }
}

pub struct CsvHistoryAdapter {
    base_path: PathBuf,
}

impl CsvHistoryAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, suffix: &str) -> PathBuf {
        self.base_path.join(format!("{}{}.csv", ticker, suffix))
    }

    fn read_error(ticker: &str, reason: String) -> PortfolioError {
        PortfolioError::HistoryRead {
            ticker: ticker.to_string(),
            reason,
        }
    }

    /// Rows of `(date, value)` from CSV `content` after checking the header text.
    fn read_columns(
        &self,
        ticker: &str,
        content: &str,
        file: &str,
        value_column: usize,
        value_header: &str,
    ) -> Result<Vec<(NaiveDate, f64)>, PortfolioError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| Self::read_error(ticker, format!("{file}: CSV parse error: {e}")))?
            .clone();
        if headers.get(DATE_COLUMN).map(str::trim) != Some("Date") {
            return Err(Self::read_error(
                ticker,
                format!("{file} does not start with 'Date'"),
            ));
        }
        if headers.get(value_column).map(str::trim) != Some(value_header) {
            return Err(Self::read_error(
                ticker,
                format!("{file} does not have '{value_header}' in column {value_column}"),
            ));
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| Self::read_error(ticker, format!("{file}: CSV parse error: {e}")))?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = record.get(DATE_COLUMN).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                Self::read_error(ticker, format!("{file}, line {line}: invalid date '{date_str}': {e}"))
            })?;

            let value_str = record.get(value_column).unwrap_or_default().trim();
            let value: f64 = value_str.parse().map_err(|e| {
                Self::read_error(
                    ticker,
                    format!("{file}, line {line}: invalid {value_header} value '{value_str}': {e}"),
                )
            })?;

            rows.push((date, value));
        }
        Ok(rows)
    }

    fn read_closes(&self, ticker: &str) -> Result<Vec<HistoryRecord>, PortfolioError> {
        let path = self.csv_path(ticker, "");
        let file = path.display().to_string();
        let content = fs::read_to_string(&path)
            .map_err(|e| Self::read_error(ticker, format!("failed to read {file}: {e}")))?;

        let mut records: Vec<HistoryRecord> = self
            .read_columns(ticker, &content, &file, CLOSE_COLUMN, "Close")?
            .into_iter()
            .map(|(date, close)| HistoryRecord::new(date, close))
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    /// Add each cash entry to the first record on or after its date.
    fn attach_cash(
        &self,
        ticker: &str,
        records: &mut [HistoryRecord],
        kind: CashKind,
    ) -> Result<(), PortfolioError> {
        let path = self.csv_path(ticker, kind.suffix());
        let file = path.display().to_string();
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(Self::read_error(ticker, format!("failed to read {file}: {e}")));
            }
        };

        for (date, amount) in self.read_columns(ticker, &content, &file, AMOUNT_COLUMN, kind.header())? {
            let idx = records.partition_point(|r| r.date < date);
            match records.get_mut(idx) {
                Some(record) => match kind {
                    CashKind::Dividend => record.dividend += amount,
                    CashKind::Distribution => record.capital_gain_distribution += amount,
                },
                None => log::warn!(
                    "{}: {} of {} on {} is after the last close, ignored",
                    ticker,
                    kind.header().to_lowercase(),
                    amount,
                    date
                ),
            }
        }
        Ok(())
    }
}

impl HistoryPort for CsvHistoryAdapter {
    fn load_security(&self, ticker: &str) -> Result<Security, PortfolioError> {
        let mut records = self.read_closes(ticker)?;
        self.attach_cash(ticker, &mut records, CashKind::Dividend)?;
        self.attach_cash(ticker, &mut records, CashKind::Distribution)?;
        log::debug!("{}: loaded {} history records", ticker, records.len());
        Security::new(ticker, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::TempDir;

    const CLOSES: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
        2024-01-15,100.0,110.0,90.0,105.0,104.0,50000\n\
        2024-01-16,105.0,115.0,100.0,110.0,109.0,60000\n\
        2024-01-18,110.0,120.0,105.0,115.0,114.0,55000\n";

    fn setup(files: &[(&str, &str)]) -> (TempDir, CsvHistoryAdapter) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let adapter = CsvHistoryAdapter::new(dir.path().to_path_buf());
        (dir, adapter)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn loads_closes_without_cash_files() {
        let (_dir, adapter) = setup(&[("AGG.csv", CLOSES)]);
        let security = adapter.load_security("AGG").unwrap();

        assert_eq!(security.ticker(), "AGG");
        assert_eq!(security.len(), 3);
        let first = &security.history()[0];
        assert_eq!(first.date, d("2024-01-15"));
        assert_eq!(first.close, 105.0);
        assert_eq!(first.dividend, 0.0);
        assert_eq!(first.capital_gain_distribution, 0.0);
    }

    #[test]
    fn attaches_cash_to_same_or_next_trading_date() {
        let (_dir, adapter) = setup(&[
            ("AGG.csv", CLOSES),
            ("AGG_div.csv", "Date,Dividends\n2024-01-15,0.25\n2024-01-17,0.5\n"),
            ("AGG_distr.csv", "Date,Distributions\n2024-01-16,1.0\n"),
        ]);
        let security = adapter.load_security("AGG").unwrap();
        let h = security.history();

        assert_abs_diff_eq!(h[0].dividend, 0.25);
        assert_abs_diff_eq!(h[1].capital_gain_distribution, 1.0);
        // 2024-01-17 has no close; it lands on 2024-01-18.
        assert_abs_diff_eq!(h[2].dividend, 0.5);
    }

    #[test]
    fn same_date_entries_accumulate() {
        let (_dir, adapter) = setup(&[
            ("AGG.csv", CLOSES),
            ("AGG_div.csv", "Date,Dividends\n2024-01-16,0.25\n2024-01-16,0.5\n"),
        ]);
        let security = adapter.load_security("AGG").unwrap();
        assert_abs_diff_eq!(security.history()[1].dividend, 0.75);
    }

    #[test]
    fn cash_after_last_close_is_dropped() {
        let (_dir, adapter) = setup(&[
            ("AGG.csv", CLOSES),
            ("AGG_div.csv", "Date,Dividends\n2024-02-01,0.25\n"),
        ]);
        let security = adapter.load_security("AGG").unwrap();
        assert!(security.history().iter().all(|r| r.dividend == 0.0));
    }

    #[test]
    fn unsorted_closes_are_sorted() {
        let closes = "Date,Open,High,Low,Close\n2024-01-16,0,0,0,2.0\n2024-01-15,0,0,0,1.0\n";
        let (_dir, adapter) = setup(&[("AGG.csv", closes)]);
        let security = adapter.load_security("AGG").unwrap();
        assert_eq!(security.first_date(), Some(d("2024-01-15")));
    }

    #[test]
    fn duplicate_close_dates_rejected() {
        let closes = "Date,Open,High,Low,Close\n2024-01-15,0,0,0,2.0\n2024-01-15,0,0,0,1.0\n";
        let (_dir, adapter) = setup(&[("AGG.csv", closes)]);
        let err = adapter.load_security("AGG").unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidHistory { .. }));
    }

    #[test]
    fn negative_close_rejected() {
        let closes = "Date,Open,High,Low,Close\n2024-01-15,0,0,0,-1.5\n";
        let (_dir, adapter) = setup(&[("AGG.csv", closes)]);
        let err = adapter.load_security("AGG").unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidHistory { .. }), "{err}");
    }

    #[test]
    fn missing_close_file_is_an_error() {
        let (_dir, adapter) = setup(&[]);
        let err = adapter.load_security("XYZ").unwrap_err();
        assert!(matches!(err, PortfolioError::HistoryRead { ticker, .. } if ticker == "XYZ"));
    }

    #[test]
    fn wrong_close_header_rejected() {
        let (_dir, adapter) = setup(&[("AGG.csv", "Date,Open,High,Low,Price\n2024-01-15,0,0,0,1\n")]);
        let err = adapter.load_security("AGG").unwrap_err();
        assert!(err.to_string().contains("'Close'"));
    }

    #[test]
    fn wrong_dividend_header_rejected() {
        let (_dir, adapter) = setup(&[
            ("AGG.csv", CLOSES),
            ("AGG_div.csv", "Day,Dividends\n2024-01-15,0.25\n"),
        ]);
        let err = adapter.load_security("AGG").unwrap_err();
        assert!(err.to_string().contains("does not start with 'Date'"));
    }

    #[test]
    fn invalid_float_reports_line() {
        let closes = "Date,Open,High,Low,Close\n2024-01-15,0,0,0,1.0\n2024-01-16,0,0,0,null\n";
        let (_dir, adapter) = setup(&[("AGG.csv", closes)]);
        let err = adapter.load_security("AGG").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("'null'"), "{msg}");
    }

    #[test]
    fn data_range_reports_bounds() {
        let (_dir, adapter) = setup(&[("AGG.csv", CLOSES)]);
        let range = adapter.data_range("AGG").unwrap();
        assert_eq!(range, Some((d("2024-01-15"), d("2024-01-18"), 3)));
    }
}
