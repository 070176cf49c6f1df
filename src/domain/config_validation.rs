//! Scenario configuration validation.
//!
//! Checks every config field before any history is loaded.

use crate::domain::allocation::parse_allocations;
use crate::domain::error::PortfolioError;
use crate::domain::rounding::RoundingPolicy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SCENARIO_SECTION: &str = "scenario";
pub const DATA_SECTION: &str = "data";

pub fn validate_scenario_config(config: &dyn ConfigPort) -> Result<(), PortfolioError> {
    validate_date(config, "start_date")?;
    validate_date(config, "end_date")?;
    validate_initial_amount(config)?;
    validate_holdings(config)?;
    validate_rounding(config)?;
    validate_data_dir(config)?;
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> PortfolioError {
    PortfolioError::ConfigInvalid {
        section: SCENARIO_SECTION.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_date(config: &dyn ConfigPort, key: &str) -> Result<(), PortfolioError> {
    match config.get_string(SCENARIO_SECTION, key) {
        None => Err(PortfolioError::ConfigMissing {
            section: SCENARIO_SECTION.to_string(),
            key: key.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| invalid(key, format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

fn validate_initial_amount(config: &dyn ConfigPort) -> Result<(), PortfolioError> {
    if config.get_string(SCENARIO_SECTION, "initial_amount").is_none() {
        return Ok(());
    }
    let value = config.get_double(SCENARIO_SECTION, "initial_amount", f64::NAN);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("initial_amount", "initial_amount must be a positive number"));
    }
    Ok(())
}

fn validate_holdings(config: &dyn ConfigPort) -> Result<(), PortfolioError> {
    let holdings = match config.get_string(SCENARIO_SECTION, "holdings") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(PortfolioError::ConfigMissing {
                section: SCENARIO_SECTION.to_string(),
                key: "holdings".to_string(),
            })
        }
    };

    let parsed = parse_allocations(&holdings).map_err(|e| invalid("holdings", e.to_string()))?;
    if let Some((ticker, weight)) = parsed.iter().find(|(_, w)| !(*w > 0.0 && *w <= 1.0)) {
        return Err(invalid(
            "holdings",
            format!("weight {weight} for {ticker} must satisfy 0 < weight <= 1"),
        ));
    }
    Ok(())
}

fn validate_rounding(config: &dyn ConfigPort) -> Result<(), PortfolioError> {
    match config.get_string(SCENARIO_SECTION, "rounding") {
        None => Ok(()),
        Some(s) => s
            .parse::<RoundingPolicy>()
            .map(|_| ())
            .map_err(|reason| invalid("rounding", reason)),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), PortfolioError> {
    match config.get_string(DATA_SECTION, "dir") {
        Some(s) if s.trim().is_empty() => Err(PortfolioError::ConfigInvalid {
            section: DATA_SECTION.to_string(),
            key: "dir".to_string(),
            reason: "dir must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}
