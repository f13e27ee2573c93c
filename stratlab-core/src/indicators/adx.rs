//! Average Directional Index (ADX) with +DI / -DI.
//!
//! Directional movement, Wilder-smoothed against true range:
//! +DI = 100 * smooth(+DM) / smooth(TR), DX = 100 * |+DI - -DI| / (+DI + -DI),
//! ADX = Wilder smoothing of DX. Lookback: 2 * period.

use super::atr::{true_range, wilder_smooth};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct AdxOutput {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn adx(bars: &[Bar], period: usize) -> AdxOutput {
    let n = bars.len();
    let nan = vec![f64::NAN; n];
    let mut out = AdxOutput { adx: nan.clone(), plus_di: nan.clone(), minus_di: nan };
    if period == 0 || n < 2 * period + 1 {
        return out;
    }

    // Per-bar raw series, aligned to bars[1..].
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut tr = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        tr.push(true_range(&bars[i], Some(bars[i - 1].close)));
    }

    let s_plus = wilder_smooth(&plus_dm, period);
    let s_minus = wilder_smooth(&minus_dm, period);
    let s_tr = wilder_smooth(&tr, period);

    let mut dx = vec![f64::NAN; n - 1];
    for i in 0..(n - 1) {
        if s_tr[i].is_nan() || s_tr[i] == 0.0 {
            continue;
        }
        let pdi = 100.0 * s_plus[i] / s_tr[i];
        let mdi = 100.0 * s_minus[i] / s_tr[i];
        out.plus_di[i + 1] = pdi;
        out.minus_di[i + 1] = mdi;
        let sum = pdi + mdi;
        dx[i] = if sum > 0.0 { 100.0 * (pdi - mdi).abs() / sum } else { 0.0 };
    }

    // ADX needs `period` finite DX values; skip the leading NaN prefix.
    if let Some(first) = dx.iter().position(|v| !v.is_nan()) {
        let smoothed = wilder_smooth(&dx[first..], period);
        for (j, v) in smoothed.iter().enumerate() {
            out.adx[first + j + 1] = *v;
        }
    }
    out
}
