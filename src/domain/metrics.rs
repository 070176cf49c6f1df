//! Summary statistics over a scenario's daily valuation trajectory.

use super::valuation::DailyResult;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub best_day: f64,
    pub worst_day: f64,
    pub trading_days: usize,
}

impl ScenarioMetrics {
    pub fn compute(results: &[DailyResult], start_amt: f64, risk_free_rate: f64) -> Self {
        let end_amt = results.last().map(|r| r.total_value).unwrap_or(start_amt);

        let total_return = if start_amt > 0.0 {
            end_amt / start_amt - 1.0
        } else {
            0.0
        };

        let calendar_days = match (results.first(), results.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days(),
            _ => 0,
        };
        let years = calendar_days as f64 / DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(results);

        let daily: Vec<f64> = results
            .iter()
            .skip(1)
            .map(|r| r.pct_change_from_previous)
            .collect();
        let (volatility, sharpe_ratio) = compute_risk_adjusted(&daily, risk_free_rate);

        let best_day = daily.iter().copied().max_by(f64::total_cmp).unwrap_or(0.0);
        let worst_day = daily.iter().copied().min_by(f64::total_cmp).unwrap_or(0.0);

        ScenarioMetrics {
            total_return,
            annualized_return,
            max_drawdown,
            max_drawdown_duration,
            volatility,
            sharpe_ratio,
            best_day,
            worst_day,
            trading_days: results.len(),
        }
    }
}

/// Deepest peak-to-trough loss as a fraction of the peak, and the longest
/// run of results spent below a prior peak.
fn compute_drawdown(results: &[DailyResult]) -> (f64, i64) {
    let mut peak = f64::NEG_INFINITY;
    let mut underwater = 0i64;
    let mut worst = (0.0_f64, 0i64);

    for value in results.iter().map(|r| r.total_value) {
        if value >= peak {
            peak = value;
            underwater = 0;
            continue;
        }
        underwater += 1;
        worst.1 = worst.1.max(underwater);
        if peak > 0.0 {
            worst.0 = worst.0.max(1.0 - value / peak);
        }
    }
    worst
}

/// Annualized volatility and Sharpe ratio of daily returns.
fn compute_risk_adjusted(returns: &[f64], risk_free_rate: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let stddev = (returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n).sqrt();

    if stddev == 0.0 {
        return (0.0, 0.0);
    }
    let excess = mean - risk_free_rate / TRADING_DAYS_PER_YEAR;
    (stddev * annualize, excess / stddev * annualize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn make_results(values: &[f64]) -> Vec<DailyResult> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut out: Vec<DailyResult> = Vec::new();
        for (i, &v) in values.iter().enumerate() {
            let mut r = DailyResult {
                date: start + chrono::Duration::days(i as i64),
                holdings: vec![],
                total_value: v,
                change_from_previous: 0.0,
                pct_change_from_previous: 0.0,
                rebalanced: false,
            };
            if let Some(prev) = out.last() {
                r.set_change_from(prev.total_value);
            }
            out.push(r);
        }
        out
    }

    #[test]
    fn empty_results() {
        let m = ScenarioMetrics::compute(&[], 10_000.0, 0.0);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.trading_days, 0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn total_return_from_start_amount() {
        let results = make_results(&[10_000.0, 10_500.0, 11_000.0]);
        let m = ScenarioMetrics::compute(&results, 10_000.0, 0.0);
        assert_abs_diff_eq!(m.total_return, 0.1, epsilon = 1e-12);
        assert_eq!(m.trading_days, 3);
    }

    #[test]
    fn annualized_over_one_year_matches_total() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut results = make_results(&[100.0, 110.0]);
        results[1].date = start + chrono::Duration::days(365);
        results[0].date = start;
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        // 365 / 365.25 years, slightly more than the raw return.
        assert!(m.annualized_return > 0.1);
        assert!(m.annualized_return < 0.1002);
    }

    #[test]
    fn drawdown_and_duration() {
        let results = make_results(&[100.0, 120.0, 90.0, 96.0, 130.0]);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert_abs_diff_eq!(m.max_drawdown, 0.25, epsilon = 1e-12);
        assert_eq!(m.max_drawdown_duration, 2);
    }

    #[test]
    fn best_and_worst_day() {
        let results = make_results(&[100.0, 110.0, 99.0]);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert_abs_diff_eq!(m.best_day, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(m.worst_day, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn falling_series_best_day_is_smallest_loss() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let results = make_results(&values);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert_abs_diff_eq!(m.best_day, -0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(m.worst_day, -1.0 / 92.0, epsilon = 1e-12);
    }

    #[test]
    fn rising_series_worst_day_is_smallest_gain() {
        let results = make_results(&[100.0, 110.0, 121.0, 124.63]);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert_abs_diff_eq!(m.best_day, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(m.worst_day, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn single_result_has_no_best_or_worst_day() {
        let m = ScenarioMetrics::compute(&make_results(&[100.0]), 100.0, 0.0);
        assert_eq!(m.best_day, 0.0);
        assert_eq!(m.worst_day, 0.0);
    }

    #[test]
    fn flat_series_has_no_volatility() {
        let results = make_results(&[100.0, 100.0, 100.0, 100.0]);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn rising_series_has_positive_sharpe() {
        let results = make_results(&[100.0, 101.0, 103.0, 104.0, 107.0]);
        let m = ScenarioMetrics::compute(&results, 100.0, 0.0);
        assert!(m.volatility > 0.0);
        assert!(m.sharpe_ratio > 0.0);
    }
}
