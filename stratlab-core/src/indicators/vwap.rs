//! Volume-Weighted Average Price (VWAP).
//!
//! Cumulative typical-price * volume over cumulative volume from the start
//! of the series. NaN while cumulative volume is zero. Lookback: 0.

use crate::domain::Bar;

pub fn vwap(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    let mut pv_sum = 0.0;
    let mut vol_sum = 0.0;
    for i in 0..n {
        let tp = bars[i].typical_price();
        if tp.is_nan() || bars[i].volume.is_nan() {
            return result;
        }
        pv_sum += tp * bars[i].volume;
        vol_sum += bars[i].volume;
        if vol_sum > 0.0 {
            result[i] = pv_sum / vol_sum;
        }
    }
    result
}
