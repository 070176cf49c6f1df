//! Daily portfolio valuation and dividend/distribution reinvestment.

use crate::domain::allocation::Allocation;
use crate::domain::date_cursor::close_index_on_or_before;
use crate::domain::rounding::RoundingPolicy;
use chrono::NaiveDate;

/// Per-security state on one simulated date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holding {
    pub shares: f64,
    /// Index into the security's history last used for valuation.
    pub history_index: usize,
}

/// Portfolio state on one simulated trading date.
///
/// `holdings` is aligned with the scenario's allocations.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub holdings: Vec<Holding>,
    pub total_value: f64,
    pub change_from_previous: f64,
    pub pct_change_from_previous: f64,
    pub rebalanced: bool,
}

impl DailyResult {
    /// Set change fields relative to the previous total value.
    ///
    /// The percentage is zero after a day valued at zero.
    pub fn set_change_from(&mut self, previous_total: f64) {
        self.change_from_previous = self.total_value - previous_total;
        self.pct_change_from_previous = if previous_total == 0.0 {
            0.0
        } else {
            self.change_from_previous / previous_total
        };
    }

    /// Sum of shares × close at each holding's history index.
    pub fn market_value(&self, allocations: &[Allocation]) -> f64 {
        self.holdings
            .iter()
            .zip(allocations)
            .map(|(h, a)| h.shares * a.security.history()[h.history_index].close)
            .sum()
    }
}

/// Advance `previous` to `date`.
///
/// Each security moves to its newest record on or before `date`. When that
/// record is new and pays a dividend or distribution, the cash is converted
/// to additional shares at that record's close. A security with no new
/// record, or a zero close, keeps its previous share count.
pub fn next_result(
    previous: &DailyResult,
    date: NaiveDate,
    allocations: &[Allocation],
    rounding: RoundingPolicy,
) -> DailyResult {
    let mut holdings = Vec::with_capacity(allocations.len());
    let mut total_value = 0.0;

    for (prev, allocation) in previous.holdings.iter().zip(allocations) {
        let history = allocation.security.history();
        let advanced = close_index_on_or_before(history, date, prev.history_index);
        let history_index = advanced.unwrap_or(prev.history_index);
        let record = &history[history_index];

        let mut shares = prev.shares;
        let cash_per_share = record.cash_per_share();
        if advanced.is_some() && cash_per_share != 0.0 {
            if record.close > 0.0 {
                let cash = rounding.cash(shares * cash_per_share);
                let new_shares = rounding.shares(cash / record.close);
                log::debug!(
                    "{} {}: reinvest {:.2} at {:.4} -> +{} shares",
                    date,
                    allocation.ticker(),
                    cash,
                    record.close,
                    new_shares
                );
                shares += new_shares;
            } else {
                log::warn!(
                    "{} {}: {} per share not reinvested at a zero close",
                    date,
                    allocation.ticker(),
                    cash_per_share
                );
            }
        }

        total_value += shares * record.close;
        holdings.push(Holding {
            shares,
            history_index,
        });
    }

    let mut result = DailyResult {
        date,
        holdings,
        total_value,
        change_from_previous: 0.0,
        pct_change_from_previous: 0.0,
        rebalanced: false,
    };
    result.set_change_from(previous.total_value);
    result
}
