//! Declarative scoring rules.
//!
//! Each rule contributes a fixed weight to the bull and/or bear score when
//! its predicate fires. Direction and confidence fall out of the two score
//! totals; the table itself stays data.

use super::divergence::Divergence;
use crate::config::SignalConfig;
use crate::domain::{Bar, MarketRegime};
use crate::indicators::IndicatorSnapshot;

/// Everything a predicate may look at for one bar.
pub struct RuleContext<'a> {
    pub bar: &'a Bar,
    pub snapshot: &'a IndicatorSnapshot,
    pub regime: MarketRegime,
    pub divergence: Option<Divergence>,
    pub config: &'a SignalConfig,
}

pub struct Rule {
    pub name: &'static str,
    pub weight: f64,
    pub bull: fn(&RuleContext) -> bool,
    pub bear: fn(&RuleContext) -> bool,
}

/// RSI zone boundaries.
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
/// Momentum magnitude that counts as a directional push.
const MOMENTUM_THRESHOLD: f64 = 0.02;

pub const RULES: &[Rule] = &[
    Rule {
        name: "trend_alignment",
        weight: 3.0,
        bull: |ctx| {
            let s = ctx.snapshot;
            s.ema_short > s.ema_medium && s.ema_medium > s.ema_long
        },
        bear: |ctx| {
            let s = ctx.snapshot;
            s.ema_short < s.ema_medium && s.ema_medium < s.ema_long
        },
    },
    // Partial alignment only counts when full alignment does not.
    Rule {
        name: "trend_partial",
        weight: 1.0,
        bull: |ctx| {
            let s = ctx.snapshot;
            s.ema_short > s.ema_medium && s.ema_medium <= s.ema_long
        },
        bear: |ctx| {
            let s = ctx.snapshot;
            s.ema_short < s.ema_medium && s.ema_medium >= s.ema_long
        },
    },
    Rule {
        name: "rsi_zone",
        weight: 2.0,
        bull: |ctx| ctx.snapshot.rsi < RSI_OVERSOLD,
        bear: |ctx| ctx.snapshot.rsi > RSI_OVERBOUGHT,
    },
    Rule {
        name: "macd",
        weight: 2.0,
        bull: |ctx| {
            let s = ctx.snapshot;
            s.macd_line > s.macd_signal && s.macd_histogram > 0.0
        },
        bear: |ctx| {
            let s = ctx.snapshot;
            s.macd_line < s.macd_signal && s.macd_histogram < 0.0
        },
    },
    Rule {
        name: "momentum",
        weight: 2.0,
        bull: |ctx| ctx.snapshot.momentum > MOMENTUM_THRESHOLD,
        bear: |ctx| ctx.snapshot.momentum < -MOMENTUM_THRESHOLD,
    },
    Rule {
        name: "sr_proximity",
        weight: 1.0,
        bull: |ctx| {
            let s = ctx.snapshot;
            s.support.is_finite()
                && (ctx.bar.close - s.support) / ctx.bar.close <= ctx.config.sr_proximity_pct
        },
        bear: |ctx| {
            let s = ctx.snapshot;
            s.resistance.is_finite()
                && (s.resistance - ctx.bar.close) / ctx.bar.close <= ctx.config.sr_proximity_pct
        },
    },
    // Above-average volume confirms the direction the bar actually moved.
    Rule {
        name: "volume_confirmation",
        weight: 1.0,
        bull: |ctx| {
            ctx.snapshot.volume_ratio >= ctx.config.volume_confirm_ratio
                && ctx.bar.close > ctx.bar.open
        },
        bear: |ctx| {
            ctx.snapshot.volume_ratio >= ctx.config.volume_confirm_ratio
                && ctx.bar.close < ctx.bar.open
        },
    },
    Rule {
        name: "regime",
        weight: 1.0,
        bull: |ctx| ctx.regime == MarketRegime::TrendingUp,
        bear: |ctx| ctx.regime == MarketRegime::TrendingDown,
    },
    Rule {
        name: "divergence",
        weight: 1.0,
        bull: |ctx| ctx.divergence == Some(Divergence::Bullish),
        bear: |ctx| ctx.divergence == Some(Divergence::Bearish),
    },
];
