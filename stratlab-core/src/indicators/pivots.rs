//! Pivot-based support and resistance.
//!
//! A pivot high (low) is a bar whose high (low) is the strict extreme of the
//! ±radius bars around it, confirmed only once the right side of the window
//! has closed. Per bar, the nearest of the 4 most recent pivot lows below the
//! close is support; the nearest of the 4 most recent pivot highs above is
//! resistance. NaN when no such level exists yet.

use crate::domain::Bar;

/// How many recent pivots on each side stay in play.
const RECENT_LEVELS: usize = 4;

#[derive(Debug, Clone)]
pub struct PivotLevels {
    /// Nearest recent pivot low below the close.
    pub support: Vec<f64>,
    /// Nearest recent pivot high above the close.
    pub resistance: Vec<f64>,
}

pub fn pivot_levels(bars: &[Bar], radius: usize) -> PivotLevels {
    let n = bars.len();
    let mut out = PivotLevels { support: vec![f64::NAN; n], resistance: vec![f64::NAN; n] };
    if radius == 0 || n < 2 * radius + 1 {
        return out;
    }

    let mut recent_highs: Vec<f64> = Vec::new();
    let mut recent_lows: Vec<f64> = Vec::new();

    for i in 0..n {
        // The pivot candidate whose confirmation window closed at bar i.
        if i >= 2 * radius {
            let j = i - radius;
            let center = &bars[j];
            if !center.is_void() {
                // Strict on the left, non-strict on the right: a flat-topped
                // plateau yields one pivot at its first bar.
                let window = &bars[j - radius..=j + radius];
                let is_high = window.iter().enumerate().all(|(k, b)| match k.cmp(&radius) {
                    std::cmp::Ordering::Less => b.high < center.high,
                    std::cmp::Ordering::Equal => true,
                    std::cmp::Ordering::Greater => b.high <= center.high,
                });
                let is_low = window.iter().enumerate().all(|(k, b)| match k.cmp(&radius) {
                    std::cmp::Ordering::Less => b.low > center.low,
                    std::cmp::Ordering::Equal => true,
                    std::cmp::Ordering::Greater => b.low >= center.low,
                });
                if is_high {
                    recent_highs.push(center.high);
                    if recent_highs.len() > RECENT_LEVELS {
                        recent_highs.remove(0);
                    }
                }
                if is_low {
                    recent_lows.push(center.low);
                    if recent_lows.len() > RECENT_LEVELS {
                        recent_lows.remove(0);
                    }
                }
            }
        }

        let close = bars[i].close;
        if close.is_nan() {
            continue;
        }
        out.support[i] = recent_lows
            .iter()
            .copied()
            .filter(|&p| p < close)
            .fold(f64::NAN, |acc, p| if acc.is_nan() || p > acc { p } else { acc });
        out.resistance[i] = recent_highs
            .iter()
            .copied()
            .filter(|&p| p > close)
            .fold(f64::NAN, |acc, p| if acc.is_nan() || p < acc { p } else { acc });
    }
    out
}
