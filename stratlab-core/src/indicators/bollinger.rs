//! Bollinger Bands.
//!
//! middle = SMA(period), upper/lower = middle ± k * population stddev.
//! Also exposes band width (upper - lower, normalized by middle) and the
//! close's position within the band in [0, 1]. Lookback: period - 1.

use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    /// (upper - lower) / middle.
    pub width: Vec<f64>,
    /// (close - lower) / (upper - lower), clamped to [0, 1]. 0.5 when the
    /// band has zero width.
    pub position: Vec<f64>,
}

pub fn bollinger(bars: &[Bar], period: usize, k: f64) -> BollingerOutput {
    let n = bars.len();
    let nan = vec![f64::NAN; n];
    let mut out = BollingerOutput {
        middle: nan.clone(),
        upper: nan.clone(),
        lower: nan.clone(),
        width: nan.clone(),
        position: nan,
    };
    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window: Vec<f64> = bars[i + 1 - period..=i].iter().map(|b| b.close).collect();
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let sd = var.sqrt();

        let upper = mean + k * sd;
        let lower = mean - k * sd;
        out.middle[i] = mean;
        out.upper[i] = upper;
        out.lower[i] = lower;
        out.width[i] = if mean != 0.0 { (upper - lower) / mean } else { f64::NAN };
        let span = upper - lower;
        out.position[i] = if span > 0.0 {
            ((bars[i].close - lower) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
    }
    out
}
