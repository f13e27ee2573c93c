//! Moving Average Convergence Divergence (MACD).
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(line, signal_period),
//! histogram = line - signal. Lookback: slow + signal - 2.

use super::ema::ema_of_series;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> MacdOutput {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_of_series(&closes, fast);
    let ema_slow = ema_of_series(&closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s) // NaN - x = NaN, so warm-up carries through
        .collect();
    let signal = ema_of_series(&line, signal_period);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdOutput { line, signal, histogram }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn macd_constant_series_is_zero() {
        let bars = make_bars(&[50.0; 60]);
        let out = macd(&bars, 12, 26, 9);
        assert_approx(out.line[40], 0.0, 1e-9);
        assert_approx(out.signal[40], 0.0, 1e-9);
        assert_approx(out.histogram[40], 0.0, 1e-9);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let bars = make_bars(&closes);
        let out = macd(&bars, 12, 26, 9);
        assert!(out.line[70] > 0.0, "fast EMA should sit above slow EMA in an uptrend");
        assert!(out.histogram[70].is_finite());
    }

    #[test]
    fn macd_warmup_nan() {
        let bars = make_bars(&(0..50).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let out = macd(&bars, 12, 26, 9);
        assert!(out.line[24].is_nan());
        assert!(!out.line[25].is_nan());
        // Signal needs 9 line values: first finite at 25 + 9 - 1 = 33.
        assert!(out.signal[32].is_nan());
        assert!(!out.signal[33].is_nan());
    }
}
