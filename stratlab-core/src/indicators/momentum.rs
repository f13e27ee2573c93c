//! Price momentum: fractional change over a lookback.
//!
//! momentum[i] = close[i] / close[i - lookback] - 1. Lookback: lookback.

use crate::domain::Bar;

pub fn momentum(bars: &[Bar], lookback: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if lookback == 0 {
        return result;
    }
    for i in lookback..n {
        let curr = bars[i].close;
        let past = bars[i - lookback].close;
        if curr.is_nan() || past.is_nan() || past == 0.0 {
            continue;
        }
        result[i] = curr / past - 1.0;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn momentum_of_flat_series_is_zero() {
        let bars = make_bars(&[100.0; 15]);
        let result = momentum(&bars, 10);
        assert!(result[9].is_nan());
        assert_approx(result[10], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn momentum_signed() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 110.0, 90.0]);
        let result = momentum(&bars, 3);
        assert_approx(result[3], 0.10, DEFAULT_EPSILON);
        assert_approx(result[4], -0.10, DEFAULT_EPSILON);
    }
}
