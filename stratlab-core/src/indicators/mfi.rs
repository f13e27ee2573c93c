//! Money Flow Index (MFI).
//!
//! Volume-weighted RSI over typical price: raw flow = typical * volume,
//! classed positive/negative by the typical-price change, ratioed over
//! `period`. Edge cases mirror RSI: no negative flow → 100, no flow → 50.
//! Lookback: period.

use crate::domain::Bar;

pub fn mfi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    // Signed raw money flow, aligned to bars[1..].
    let mut flows = vec![f64::NAN; n];
    for i in 1..n {
        let tp = bars[i].typical_price();
        let prev_tp = bars[i - 1].typical_price();
        if tp.is_nan() || prev_tp.is_nan() || bars[i].volume.is_nan() {
            continue;
        }
        let raw = tp * bars[i].volume;
        flows[i] = if tp > prev_tp {
            raw
        } else if tp < prev_tp {
            -raw
        } else {
            0.0
        };
    }

    for i in period..n {
        let window = &flows[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let positive: f64 = window.iter().filter(|v| **v > 0.0).sum();
        let negative: f64 = -window.iter().filter(|v| **v < 0.0).sum::<f64>();
        result[i] = if negative == 0.0 && positive == 0.0 {
            50.0
        } else if negative == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + positive / negative)
        };
    }
    result
}
