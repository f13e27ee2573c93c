//! Exponential Moving Average (EMA).
//!
//! alpha = 2 / (period + 1), seeded with the SMA of the first `period`
//! values. Lookback: period - 1.

use crate::domain::Bar;

pub fn ema(bars: &[Bar], period: usize) -> Vec<f64> {
    ema_of_series(&bars.iter().map(|b| b.close).collect::<Vec<_>>(), period)
}

/// EMA over an arbitrary series (used directly by the MACD signal line).
///
/// Leading NaNs are skipped so the seed window starts at the first finite
/// value; a NaN after the seed poisons the rest of the output.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let first = match values.iter().position(|v| !v.is_nan()) {
        Some(i) => i,
        None => return result,
    };
    if n - first < period {
        return result;
    }

    // SMA seed over the first full window of finite values.
    let seed_end = first + period - 1;
    let seed_window = &values[first..=seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end] = prev;

    let alpha = 2.0 / (period as f64 + 1.0);
    for i in (seed_end + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}
