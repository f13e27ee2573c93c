//! Precomputed indicator series and per-bar snapshots.
//!
//! Every indicator is computed once over the full bar slice, then the bar
//! loop reads an `IndicatorSnapshot` per index. Snapshots never see values
//! past their own bar.

use serde::{Deserialize, Serialize};

use super::{
    adx, atr, bollinger, ema, macd, mfi, momentum, obv, pivot_levels, rsi, stochastic,
    volume_ratio, vwap, williams_r, AdxOutput, BollingerOutput, MacdOutput, PivotLevels,
    StochasticOutput,
};
use crate::config::IndicatorConfig;
use crate::domain::Bar;

/// All indicator series for one bar slice.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    len: usize,
    pub rsi: Vec<f64>,
    pub ema_short: Vec<f64>,
    pub ema_medium: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub macd: MacdOutput,
    pub atr: Vec<f64>,
    pub bollinger: BollingerOutput,
    pub adx: AdxOutput,
    pub stochastic: StochasticOutput,
    pub williams_r: Vec<f64>,
    pub obv: Vec<f64>,
    pub vwap: Vec<f64>,
    pub mfi: Vec<f64>,
    pub volume_ratio: Vec<f64>,
    pub momentum: Vec<f64>,
    pub pivots: PivotLevels,
}

impl IndicatorSeries {
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Self {
        Self {
            len: bars.len(),
            rsi: rsi(bars, config.rsi_period),
            ema_short: ema(bars, config.ema_short),
            ema_medium: ema(bars, config.ema_medium),
            ema_long: ema(bars, config.ema_long),
            macd: macd(bars, config.macd_fast, config.macd_slow, config.macd_signal),
            atr: atr(bars, config.atr_period),
            bollinger: bollinger(bars, config.bollinger_period, config.bollinger_k),
            adx: adx(bars, config.adx_period),
            stochastic: stochastic(bars, config.stochastic_k, config.stochastic_d),
            williams_r: williams_r(bars, config.stochastic_k),
            obv: obv(bars),
            vwap: vwap(bars),
            mfi: mfi(bars, config.mfi_period),
            volume_ratio: volume_ratio(bars, config.volume_sma_period),
            momentum: momentum(bars, config.momentum_lookback),
            pivots: pivot_levels(bars, config.pivot_radius),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The indicator values at bar `index`.
    pub fn snapshot(&self, index: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: self.rsi[index],
            ema_short: self.ema_short[index],
            ema_medium: self.ema_medium[index],
            ema_long: self.ema_long[index],
            macd_line: self.macd.line[index],
            macd_signal: self.macd.signal[index],
            macd_histogram: self.macd.histogram[index],
            atr: self.atr[index],
            bb_upper: self.bollinger.upper[index],
            bb_middle: self.bollinger.middle[index],
            bb_lower: self.bollinger.lower[index],
            bb_width: self.bollinger.width[index],
            bb_position: self.bollinger.position[index],
            adx: self.adx.adx[index],
            plus_di: self.adx.plus_di[index],
            minus_di: self.adx.minus_di[index],
            stoch_k: self.stochastic.k[index],
            stoch_d: self.stochastic.d[index],
            williams_r: self.williams_r[index],
            obv: self.obv[index],
            vwap: self.vwap[index],
            mfi: self.mfi[index],
            volume_ratio: self.volume_ratio[index],
            momentum: self.momentum[index],
            support: self.pivots.support[index],
            resistance: self.pivots.resistance[index],
        }
    }
}

/// Indicator values at a single bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ema_short: f64,
    pub ema_medium: f64,
    pub ema_long: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub atr: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    pub bb_position: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub williams_r: f64,
    pub obv: f64,
    pub vwap: f64,
    pub mfi: f64,
    pub volume_ratio: f64,
    pub momentum: f64,
    /// NaN when no recent pivot level sits on that side of the price.
    pub support: f64,
    pub resistance: f64,
}

impl IndicatorSnapshot {
    /// True once every indicator the scoring rules read is past warm-up.
    /// Support/resistance are excluded: their absence is a valid state.
    pub fn is_warm(&self) -> bool {
        [
            self.rsi,
            self.ema_short,
            self.ema_medium,
            self.ema_long,
            self.macd_line,
            self.macd_signal,
            self.macd_histogram,
            self.atr,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.stoch_k,
            self.stoch_d,
            self.volume_ratio,
            self.momentum,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
