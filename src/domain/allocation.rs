//! Target allocations: which securities a scenario holds and at what weight.

use crate::domain::history::Security;
use std::collections::HashSet;
use std::sync::Arc;

/// A security held by a scenario together with its target weight.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub security: Arc<Security>,
    pub weight: f64,
}

impl Allocation {
    pub fn ticker(&self) -> &str {
        self.security.ticker()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("empty token in holdings list")]
    EmptyToken,

    #[error("holding '{0}' is not in TICKER:weight form")]
    MissingWeight(String),

    #[error("invalid weight '{weight}' for {ticker}")]
    InvalidWeight { ticker: String, weight: String },

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse `"FXAIX:0.6, AGG:0.4"` into ordered `(ticker, weight)` pairs.
///
/// Tickers are uppercased. Weight bounds are not checked here.
pub fn parse_allocations(input: &str) -> Result<Vec<(String, f64)>, AllocationError> {
    let mut holdings = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AllocationError::EmptyToken);
        }

        let (ticker, weight) = trimmed
            .split_once(':')
            .ok_or_else(|| AllocationError::MissingWeight(trimmed.to_string()))?;

        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AllocationError::EmptyToken);
        }

        let weight_str = weight.trim();
        let weight: f64 = weight_str
            .parse()
            .map_err(|_| AllocationError::InvalidWeight {
                ticker: ticker.clone(),
                weight: weight_str.to_string(),
            })?;

        if !seen.insert(ticker.clone()) {
            return Err(AllocationError::DuplicateTicker(ticker));
        }
        holdings.push((ticker, weight));
    }

    Ok(holdings)
}
