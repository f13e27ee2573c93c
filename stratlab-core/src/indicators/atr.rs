//! Average True Range (ATR).
//!
//! True range = max(high - low, |high - prev_close|, |low - prev_close|),
//! Wilder-smoothed over `period`. Lookback: period.

use crate::domain::Bar;

/// True range of `bar` against the previous close. For the first bar
/// (no previous close) this is just high - low.
pub fn true_range(bar: &Bar, prev_close: Option<f64>) -> f64 {
    let hl = bar.high - bar.low;
    match prev_close {
        Some(pc) if !pc.is_nan() => {
            let hc = (bar.high - pc).abs();
            let lc = (bar.low - pc).abs();
            hl.max(hc).max(lc)
        }
        _ => hl,
    }
}

/// Wilder smoothing: SMA seed over the first `period` values, then
/// smoothed[i] = (smoothed[i-1] * (period - 1) + value[i]) / period.
/// A NaN input ends the output early.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let seed = &values[..period];
    if seed.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut prev = seed.iter().sum::<f64>() / period as f64;
    result[period - 1] = prev;

    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        prev = (prev * (period as f64 - 1.0) + values[i]) / period as f64;
        result[i] = prev;
    }
    result
}

pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    if n == 0 {
        return Vec::new();
    }

    let mut tr = Vec::with_capacity(n);
    tr.push(f64::NAN); // no previous close, excluded from the seed
    for i in 1..n {
        tr.push(true_range(&bars[i], Some(bars[i - 1].close)));
    }

    // Smooth over tr[1..], then shift back so atr[i] aligns with bars[i].
    let smoothed = wilder_smooth(&tr[1..], period);
    let mut result = vec![f64::NAN; n];
    result[1..].copy_from_slice(&smoothed);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_uses_prev_close_gap() {
        let bars = make_bars(&[100.0, 110.0]);
        // bar[1]: open=100, close=110, high=111, low=99; prev close 100
        let tr = true_range(&bars[1], Some(bars[0].close));
        assert_approx(tr, 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_without_prev_close() {
        let bars = make_bars(&[100.0]);
        assert_approx(true_range(&bars[0], None), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_constant() {
        let result = wilder_smooth(&[3.0; 10], 4);
        assert!(result[2].is_nan());
        for v in &result[3..] {
            assert_approx(*v, 3.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn atr_constant_range() {
        // make_bars gives every bar a 2.0+|change| range; flat closes → TR = 2.0
        let bars = make_bars(&[100.0; 12]);
        let result = atr(&bars, 5);
        assert!(result[4].is_nan());
        assert_approx(result[5], 2.0, 1e-9);
        assert_approx(result[11], 2.0, 1e-9);
    }

    #[test]
    fn atr_warmup_alignment() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        let result = atr(&bars, 3);
        // First ATR lands at index period (bar 0 contributes no TR).
        assert!(result[2].is_nan());
        assert!(!result[3].is_nan());
    }

    #[test]
    fn atr_positive() {
        let bars = make_bars(&[100.0, 103.0, 99.0, 105.0, 102.0, 108.0, 104.0]);
        let result = atr(&bars, 3);
        for v in result.iter().filter(|v| !v.is_nan()) {
            assert!(*v > 0.0);
        }
    }
}
