//! Mid-month rebalancing: when to rebalance and how.

use crate::domain::allocation::Allocation;
use crate::domain::error::PortfolioError;
use crate::domain::rounding::RoundingPolicy;
use crate::domain::valuation::DailyResult;
use chrono::{Datelike, NaiveDate};

/// Rebalancing happens on the first trading day on or after this day of month.
pub const REBALANCE_DAY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceState {
    NotDue,
    Due,
}

/// Decide whether `current` is a rebalance day given the previous result date.
///
/// Due when `current` is on or after the 15th and the previous date was
/// before it, so it fires once per month even when the 15th has no trading.
/// Never due without a previous result.
pub fn evaluate(previous: Option<NaiveDate>, current: NaiveDate) -> RebalanceState {
    match previous {
        Some(prev) if current.day() >= REBALANCE_DAY && prev.day() < REBALANCE_DAY => {
            RebalanceState::Due
        }
        _ => RebalanceState::NotDue,
    }
}

/// Reallocate the whole portfolio to target weights at the current closes.
///
/// Shares become `total_value * weight / close`, then `total_value` is
/// recomputed from the new shares so it always equals the market value.
/// A zero close cannot be bought into; `result` is left untouched then.
pub fn apply_target_weights(
    result: &mut DailyResult,
    allocations: &[Allocation],
    rounding: RoundingPolicy,
) -> Result<(), PortfolioError> {
    for (holding, allocation) in result.holdings.iter().zip(allocations) {
        let record = &allocation.security.history()[holding.history_index];
        if record.close <= 0.0 {
            return Err(PortfolioError::ZeroClose {
                ticker: allocation.ticker().to_string(),
                date: record.date.to_string(),
            });
        }
    }

    let value = result.total_value;
    for (holding, allocation) in result.holdings.iter_mut().zip(allocations) {
        let close = allocation.security.history()[holding.history_index].close;
        holding.shares = rounding.shares(value * allocation.weight / close);
    }
    result.total_value = result.market_value(allocations);
    result.rebalanced = true;
    Ok(())
}
