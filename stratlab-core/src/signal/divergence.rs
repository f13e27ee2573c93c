//! Price/oscillator divergence.
//!
//! Compares the direction of the last two price swing extremes against the
//! oscillator's direction over the same bars. Bearish: price prints a higher
//! swing high while RSI (or the MACD line) prints a lower one. Bullish: the
//! mirror on swing lows.

use crate::domain::Bar;
use crate::indicators::IndicatorSeries;

/// Bars on each side a close must dominate to count as a swing.
const SWING_RADIUS: usize = 2;
/// How far back swings are searched.
const SWING_LOOKBACK: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// Price lower low, oscillator higher low. Supports buys.
    Bullish,
    /// Price higher high, oscillator lower high. Supports sells.
    Bearish,
}

pub fn detect_divergence(
    bars: &[Bar],
    series: &IndicatorSeries,
    index: usize,
) -> Option<Divergence> {
    let start = index.saturating_sub(SWING_LOOKBACK);

    if let Some((a, b)) = last_two_swings(bars, start, index, true) {
        let (osc_a, osc_b) = (oscillator(series, a)?, oscillator(series, b)?);
        if bars[b].close > bars[a].close && osc_b < osc_a {
            return Some(Divergence::Bearish);
        }
    }
    if let Some((a, b)) = last_two_swings(bars, start, index, false) {
        let (osc_a, osc_b) = (oscillator(series, a)?, oscillator(series, b)?);
        if bars[b].close < bars[a].close && osc_b > osc_a {
            return Some(Divergence::Bullish);
        }
    }
    None
}

/// RSI when warm, otherwise the MACD line; None when neither is.
fn oscillator(series: &IndicatorSeries, index: usize) -> Option<f64> {
    if series.rsi[index].is_finite() {
        Some(series.rsi[index])
    } else if series.macd.line[index].is_finite() {
        Some(series.macd.line[index])
    } else {
        None
    }
}

/// Indices of the last two confirmed close swings (highs when `highs`,
/// lows otherwise) in `[start, index]`, oldest first. A swing at j needs
/// its full right window inside the range, so it is known at `index`.
fn last_two_swings(
    bars: &[Bar],
    start: usize,
    index: usize,
    highs: bool,
) -> Option<(usize, usize)> {
    if index < 2 * SWING_RADIUS {
        return None;
    }
    let mut found: Vec<usize> = Vec::new();
    let lo = start.max(SWING_RADIUS);
    for j in lo..=(index - SWING_RADIUS) {
        let c = bars[j].close;
        if c.is_nan() {
            continue;
        }
        let window = &bars[j - SWING_RADIUS..=j + SWING_RADIUS];
        let dominated = window.iter().enumerate().any(|(k, b)| {
            k != SWING_RADIUS && if highs { b.close >= c } else { b.close <= c }
        });
        if !dominated {
            found.push(j);
        }
    }
    match found.as_slice() {
        [.., a, b] => Some((*a, *b)),
        _ => None,
    }
}
