//! Engine error types.

use thiserror::Error;

/// Configuration rejected before any computation runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid period for '{name}': {value} (must be > 0)")]
    InvalidPeriod { name: &'static str, value: usize },

    #[error("'{name}' = {value} outside [0, 1]")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("'{name}' = {value} must be positive")]
    NonPositive { name: &'static str, value: f64 },

    #[error("period ordering violated: {detail}")]
    PeriodOrdering { detail: &'static str },

    #[error("min_stop_pct {min} > max_stop_pct {max}")]
    StopBandInverted { min: f64, max: f64 },

    #[error("take-profit tiers malformed: {detail}")]
    MalformedTiers { detail: &'static str },

    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Input bars rejected, or a window too short to simulate.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("insufficient data: {got} bars < minimum {need}")]
    InsufficientBars { got: usize, need: usize },

    #[error("non-monotonic timestamp at bar {index}")]
    NonMonotonicTimestamps { index: usize },

    #[error("bar {index} has NaN or inconsistent OHLCV")]
    InvalidBar { index: usize },
}
