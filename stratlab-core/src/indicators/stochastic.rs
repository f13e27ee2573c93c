//! Stochastic oscillator (%K / %D).
//!
//! %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over
//! `k_period`; %D = SMA(%K, d_period). 50 when the range is flat.
//! Lookback: k_period + d_period - 2.

use super::sma::sma_of_series;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct StochasticOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> StochasticOutput {
    let n = bars.len();
    let mut k = vec![f64::NAN; n];
    if k_period == 0 || n < k_period {
        return StochasticOutput { d: k.clone(), k };
    }

    for i in (k_period - 1)..n {
        let window = &bars[i + 1 - k_period..=i];
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
        k[i] = if span > 0.0 { 100.0 * (bars[i].close - lowest) / span } else { 50.0 };
    }

    let d = sma_of_series(&k, d_period);
    StochasticOutput { k, d }
}
