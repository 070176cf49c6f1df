//! Portfolio scenario: securities, target weights, date bounds, and the
//! day-stepping run that produces the daily valuation trajectory.

use crate::domain::allocation::Allocation;
use crate::domain::date_cursor::{earliest_date_after, latest_index_on_or_before};
use crate::domain::error::PortfolioError;
use crate::domain::history::Security;
use crate::domain::rebalance::{self, RebalanceState};
use crate::domain::rounding::RoundingPolicy;
use crate::domain::valuation::{self, DailyResult, Holding};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lifecycle of a scenario. `Validated` and `Running` are only held while
/// `run` executes; callers observe `Uninitialized`, `Complete` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    Uninitialized,
    Validated,
    Running,
    Complete,
    Failed,
}

/// A scenario date bound as supplied by the caller.
///
/// The text is kept until `run` so that a malformed bound is reported as
/// `InvalidDateFormat` there. Unparseable text still narrows by comparing
/// against the fixed-width `YYYY-MM-DD` form of history dates.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateBound {
    raw: String,
}

impl DateBound {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.trim().to_string(),
        }
    }

    fn parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.raw, DATE_FORMAT).ok()
    }

    fn is_before(&self, date: NaiveDate) -> bool {
        match self.parsed() {
            Some(d) => d < date,
            None => self.raw < date.format(DATE_FORMAT).to_string(),
        }
    }

    fn is_after(&self, date: NaiveDate) -> bool {
        match self.parsed() {
            Some(d) => d > date,
            None => self.raw > date.format(DATE_FORMAT).to_string(),
        }
    }

    fn set(&mut self, date: NaiveDate) {
        self.raw = date.format(DATE_FORMAT).to_string();
    }

    fn parse(&self, field: &str) -> Result<NaiveDate, PortfolioError> {
        self.parsed().ok_or_else(|| PortfolioError::InvalidDateFormat {
            field: field.to_string(),
            value: self.raw.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    start_amt: f64,
    end_amt: f64,
    pct_change: f64,
}

/// A buy-and-hold portfolio rebalanced mid-month to fixed target weights.
#[derive(Debug, Clone)]
pub struct PortfolioScenario {
    start: DateBound,
    end: DateBound,
    allocations: Vec<Allocation>,
    results: Vec<DailyResult>,
    rounding: RoundingPolicy,
    state: ScenarioState,
    summary: Option<Summary>,
}

impl PortfolioScenario {
    /// Create a scenario with tentative inclusive bounds (`YYYY-MM-DD`).
    ///
    /// Bounds are validated by [`run`](Self::run), and each added security
    /// may narrow them.
    pub fn new(start_date: &str, end_date: &str) -> Self {
        Self {
            start: DateBound::new(start_date),
            end: DateBound::new(end_date),
            allocations: Vec::new(),
            results: Vec::new(),
            rounding: RoundingPolicy::default(),
            state: ScenarioState::Uninitialized,
            summary: None,
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    /// Add a security at `weight` of total value, `0 < weight <= 1`.
    ///
    /// Narrows the scenario bounds to the security's history range; bounds
    /// never widen.
    pub fn add_security(&mut self, security: Arc<Security>, weight: f64) -> Result<(), PortfolioError> {
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(PortfolioError::InvalidWeight {
                ticker: security.ticker().to_string(),
                weight,
            });
        }

        if let (Some(first), Some(last)) = (security.first_date(), security.last_date()) {
            if self.start.is_before(first) {
                self.start.set(first);
            }
            if self.end.is_after(last) {
                self.end.set(last);
            }
        }

        self.allocations.push(Allocation { security, weight });
        Ok(())
    }

    /// Simulate from the start date to the end date with `initial_amount`.
    ///
    /// Validation failures leave the result sequence empty. A completed
    /// scenario cannot be run again.
    pub fn run(&mut self, initial_amount: f64) -> Result<(), PortfolioError> {
        if self.state == ScenarioState::Complete {
            return Err(PortfolioError::AlreadyRun);
        }

        match self.simulate(initial_amount) {
            Ok((results, summary)) => {
                self.results = results;
                self.summary = Some(summary);
                self.state = ScenarioState::Complete;
                Ok(())
            }
            Err(e) => {
                self.state = ScenarioState::Failed;
                Err(e)
            }
        }
    }

    fn validate(&self, initial_amount: f64) -> Result<(NaiveDate, NaiveDate), PortfolioError> {
        if !initial_amount.is_finite() || initial_amount <= 0.0 {
            return Err(PortfolioError::InvalidInitialAmount {
                amount: initial_amount,
            });
        }
        if self.allocations.is_empty() {
            return Err(PortfolioError::NoSecurities);
        }

        let start = self.start.parse("start_date")?;
        let end = self.end.parse("end_date")?;
        if start >= end {
            return Err(PortfolioError::InvalidDateRange {
                start: self.start.raw.clone(),
                end: self.end.raw.clone(),
            });
        }
        Ok((start, end))
    }

    fn simulate(&mut self, initial_amount: f64) -> Result<(Vec<DailyResult>, Summary), PortfolioError> {
        let (start, end) = self.validate(initial_amount)?;
        self.state = ScenarioState::Validated;

        let first = self.seed(start, initial_amount)?;
        self.state = ScenarioState::Running;

        log::info!(
            "running scenario {} to {}: {} securities, initial amount {:.2}",
            start,
            end,
            self.allocations.len(),
            initial_amount
        );

        let capacity = (end - start).num_days() as usize + 1;
        let mut results = Vec::with_capacity(capacity);
        let mut previous = first;

        while let Some(date) = self.next_step_date(&previous).filter(|&d| d <= end) {
            let mut current = valuation::next_result(&previous, date, &self.allocations, self.rounding);
            if rebalance::evaluate(Some(previous.date), date) == RebalanceState::Due {
                rebalance::apply_target_weights(&mut current, &self.allocations, self.rounding)?;
                current.set_change_from(previous.total_value);
                log::debug!("{}: rebalanced at value {:.2}", date, current.total_value);
            }
            results.push(std::mem::replace(&mut previous, current));
        }

        let end_amt = previous.total_value;
        results.push(previous);

        let summary = Summary {
            start_amt: initial_amount,
            end_amt,
            pct_change: end_amt / initial_amount - 1.0,
        };

        log::info!(
            "scenario complete: {} results, end amount {:.2} ({:+.4}%)",
            results.len(),
            summary.end_amt,
            summary.pct_change * 100.0
        );

        Ok((results, summary))
    }

    /// First result: opening value on the start date, allocated to targets.
    fn seed(&self, start: NaiveDate, initial_amount: f64) -> Result<DailyResult, PortfolioError> {
        let holdings = self
            .allocations
            .iter()
            .map(|a| {
                latest_index_on_or_before(a.security.history(), start, 0)
                    .map(|history_index| Holding {
                        shares: 0.0,
                        history_index,
                    })
                    .ok_or_else(|| PortfolioError::DataGap {
                        ticker: a.ticker().to_string(),
                        date: start.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut first = DailyResult {
            date: start,
            holdings,
            total_value: initial_amount,
            change_from_previous: 0.0,
            pct_change_from_previous: 0.0,
            rebalanced: false,
        };
        rebalance::apply_target_weights(&mut first, &self.allocations, self.rounding)?;
        first.set_change_from(initial_amount);
        Ok(first)
    }

    /// Earliest history date after `last.date` across all securities.
    fn next_step_date(&self, last: &DailyResult) -> Option<NaiveDate> {
        self.allocations
            .iter()
            .zip(&last.holdings)
            .filter_map(|(a, h)| earliest_date_after(a.security.history(), last.date, h.history_index))
            .min()
    }

    pub fn start_date(&self) -> &str {
        &self.start.raw
    }

    pub fn end_date(&self) -> &str {
        &self.end.raw
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn securities(&self) -> impl Iterator<Item = &Security> {
        self.allocations.iter().map(|a| a.security.as_ref())
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn results(&self) -> &[DailyResult] {
        &self.results
    }

    pub fn start_amt(&self) -> Option<f64> {
        self.summary.map(|s| s.start_amt)
    }

    pub fn end_amt(&self) -> Option<f64> {
        self.summary.map(|s| s.end_amt)
    }

    pub fn pct_change(&self) -> Option<f64> {
        self.summary.map(|s| s.pct_change)
    }

    /// Rebalances after the opening allocation.
    pub fn rebalance_count(&self) -> usize {
        self.results.iter().skip(1).filter(|r| r.rebalanced).count()
    }
}

impl fmt::Display for PortfolioScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} to {}, {} securities, {} results",
            self.start.raw,
            self.end.raw,
            self.allocations.len(),
            self.results.len()
        )?;
        for a in &self.allocations {
            let range = match (a.security.first_date(), a.security.last_date()) {
                (Some(first), Some(last)) => format!("{first} to {last}"),
                _ => "no history".to_string(),
            };
            writeln!(
                f,
                "  {} {:.2}% - {} records, {}",
                a.ticker(),
                a.weight * 100.0,
                a.security.len(),
                range
            )?;
        }
        Ok(())
    }
}
