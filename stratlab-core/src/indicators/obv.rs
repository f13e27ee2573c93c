//! On-Balance Volume (OBV).
//!
//! Running sum starting at 0: add volume on an up close, subtract on a
//! down close, carry on an unchanged close. Lookback: 0.

use crate::domain::Bar;

pub fn obv(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }
    if bars[0].close.is_nan() || bars[0].volume.is_nan() {
        return result;
    }

    let mut running = 0.0;
    result[0] = running;
    for i in 1..n {
        let curr = bars[i].close;
        let prev = bars[i - 1].close;
        if curr.is_nan() || prev.is_nan() || bars[i].volume.is_nan() {
            return result;
        }
        if curr > prev {
            running += bars[i].volume;
        } else if curr < prev {
            running -= bars[i].volume;
        }
        result[i] = running;
    }
    result
}
