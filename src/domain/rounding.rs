//! Share and cash rounding.

use std::fmt;
use std::str::FromStr;

pub const CENT_DECIMALS: i32 = 2;
pub const SHARE_DECIMALS: i32 = 3;

/// Round to `decimals` places, ties to the even digit.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// How reinvested cash and share counts are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingPolicy {
    /// Cash to the cent, shares to the thousandth, ties to even.
    #[default]
    Rounded,
    /// No rounding.
    Exact,
}

impl RoundingPolicy {
    pub fn cash(self, amount: f64) -> f64 {
        match self {
            RoundingPolicy::Rounded => round_half_even(amount, CENT_DECIMALS),
            RoundingPolicy::Exact => amount,
        }
    }

    pub fn shares(self, shares: f64) -> f64 {
        match self {
            RoundingPolicy::Rounded => round_half_even(shares, SHARE_DECIMALS),
            RoundingPolicy::Exact => shares,
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingPolicy::Rounded => write!(f, "rounded"),
            RoundingPolicy::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rounded" => Ok(RoundingPolicy::Rounded),
            "exact" => Ok(RoundingPolicy::Exact),
            other => Err(format!("unknown rounding policy '{other}' (expected rounded or exact)")),
        }
    }
}
