//! Williams %R.
//!
//! %R = -100 * (highest_high - close) / (highest_high - lowest_low) over
//! `period`. Range [-100, 0]; -50 when the range is flat.
//! Lookback: period - 1.

use crate::domain::Bar;

pub fn williams_r(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let mut lowest = f64::INFINITY;
        let mut highest = f64::NEG_INFINITY;
        for bar in window {
            if bar.high.is_nan() || bar.low.is_nan() {
                lowest = f64::NAN;
                break;
            }
            lowest = lowest.min(bar.low);
            highest = highest.max(bar.high);
        }
        if lowest.is_nan() || bars[i].close.is_nan() {
            continue;
        }
        let span = highest - lowest;
        result[i] = if span > 0.0 { -100.0 * (highest - bars[i].close) / span } else { -50.0 };
    }
    result
}
