//! Indicator library.
//!
//! All indicators are pure vector-form functions over a bar slice: output[i]
//! depends only on bars[..=i], with NaN for every position before warm-up.
//! A NaN input close poisons all subsequent outputs rather than silently
//! skipping the bar.
//!
//! Multi-series indicators (MACD, Bollinger, ADX, Stochastic) return a small
//! output struct of parallel `Vec<f64>`s.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod mfi;
pub mod momentum;
pub mod obv;
pub mod pivots;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stochastic;
pub mod volume;
pub mod vwap;
pub mod williams_r;

pub use adx::{adx, AdxOutput};
pub use atr::{atr, true_range, wilder_smooth};
pub use bollinger::{bollinger, BollingerOutput};
pub use ema::{ema, ema_of_series};
pub use macd::{macd, MacdOutput};
pub use mfi::mfi;
pub use momentum::momentum;
pub use obv::obv;
pub use pivots::{pivot_levels, PivotLevels};
pub use rsi::rsi;
pub use sma::sma;
pub use snapshot::{IndicatorSeries, IndicatorSnapshot};
pub use stochastic::{stochastic, StochasticOutput};
pub use volume::{volume_ratio, volume_sma};
pub use vwap::vwap;
pub use williams_r::williams_r;

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 100.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use chrono::{Duration, TimeZone, Utc};

    use crate::domain::Bar;
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 100.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
