//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the last `period` closes. Lookback: period - 1.

use crate::domain::Bar;

pub fn sma(bars: &[Bar], period: usize) -> Vec<f64> {
    sma_of_series(&bars.iter().map(|b| b.close).collect::<Vec<_>>(), period)
}

/// SMA over an arbitrary series. NaN inputs inside the window yield NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}
