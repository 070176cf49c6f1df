//! Simulation domain: histories, the date cursor, valuation, rebalancing
//! and the scenario driver.

pub mod allocation;
pub mod config_validation;
pub mod date_cursor;
pub mod error;
pub mod history;
pub mod metrics;
pub mod rebalance;
pub mod rounding;
pub mod scenario;
pub mod valuation;
