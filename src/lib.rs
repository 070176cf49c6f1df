//! portfolio_sim: backtests a periodically rebalanced multi-security portfolio.
//!
//! Hexagonal architecture: simulation logic in [`domain`], port traits in
//! [`ports`], file-backed implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
