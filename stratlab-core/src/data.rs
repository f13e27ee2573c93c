//! Bar validation and deterministic synthetic market data.

use chrono::{Duration, TimeZone, Utc};
use rand::prelude::*;

use crate::domain::Bar;
use crate::error::DataError;

/// Validate a bar series before simulation.
///
/// Checks, in order: enough bars for `min_bars`, strictly increasing
/// timestamps, and per-bar OHLCV sanity (no NaN, high >= low, range
/// containing open and close).
pub fn validate_bars(bars: &[Bar], min_bars: usize) -> Result<(), DataError> {
    if bars.len() < min_bars {
        return Err(DataError::InsufficientBars { got: bars.len(), need: min_bars });
    }
    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(DataError::InvalidBar { index: i });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(DataError::NonMonotonicTimestamps { index: i });
        }
    }
    Ok(())
}

/// Deterministic synthetic price series: Gaussian noise plus a slow
/// sinusoidal trend and mild mean reversion toward the initial price,
/// floored at 10% of it. Same seed, same bars.
pub fn synthetic_bars(n: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    let floor = 0.1 * initial_price;

    let mut bars = Vec::with_capacity(n);
    let mut price = initial_price;
    for i in 0..n {
        let noise = 0.0001 + 0.02 * sample_standard_normal(&mut rng);
        let trend = 0.00005 * ((i as f64) / 100.0).sin();
        let reversion = -0.05 * (price / initial_price - 1.0);
        let ret = noise + trend + reversion;

        let open = price;
        price = (price * (1.0 + ret)).max(floor);
        let close = price;

        let wick: f64 = rng.gen_range(0.0..0.005);
        let high = open.max(close) * (1.0 + wick);
        let low = open.min(close) * (1.0 - wick);
        let volume = rng.gen_range(50.0..150.0);

        bars.push(Bar {
            timestamp: start + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
    }
    bars
}

/// Box-Muller transform: two uniforms to one standard normal.
fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Hourly bar helper used across tests and benchmarks: closes supplied by
/// the caller, open = previous close, range padded around the body.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open,
                high: open.max(close) * 1.001,
                low: open.min(close) * 0.999,
                close,
                volume: 100.0,
            }
        })
        .collect()
}
