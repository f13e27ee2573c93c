//! Rolling volume average and the current bar's ratio against it.
//!
//! Feeds the volume-confirmation scoring rule: a ratio above the configured
//! threshold counts as participation behind the move.

use super::sma::sma_of_series;
use crate::domain::Bar;

/// SMA of volume over `period`. Lookback: period - 1.
pub fn volume_sma(bars: &[Bar], period: usize) -> Vec<f64> {
    sma_of_series(&bars.iter().map(|b| b.volume).collect::<Vec<_>>(), period)
}

/// volume / volume_sma per bar; NaN until the average is warm or when the
/// average is zero.
pub fn volume_ratio(bars: &[Bar], period: usize) -> Vec<f64> {
    let avg = volume_sma(bars, period);
    bars.iter()
        .zip(&avg)
        .map(|(bar, &a)| {
            if a.is_nan() || a == 0.0 || bar.volume.is_nan() {
                f64::NAN
            } else {
                bar.volume / a
            }
        })
        .collect()
}
