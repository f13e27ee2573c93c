//! Serializable backtest configuration.
//!
//! A `BacktestConfig` captures everything needed to reproduce a run: indicator
//! periods, signal thresholds, risk rules, and execution costs. Two runs with
//! equal configs over equal bars produce identical results, so the blake3
//! `run_id` doubles as a cache key for external callers.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    /// Starting cash.
    pub initial_capital: f64,

    /// Commission as a fraction of fill notional, charged on every fill.
    pub commission_rate: f64,

    /// Fill slippage as a fraction of the close (paid on entry, given back
    /// on exit: buys fill high, sells fill low).
    pub slippage_rate: f64,

    /// Record every actionable signal on the result for auditing.
    #[serde(default)]
    pub record_signals: bool,

    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub risk: RiskConfig,
}

/// Indicator lookback periods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_short: usize,
    pub ema_medium: usize,
    pub ema_long: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_period: usize,
    pub bollinger_period: usize,
    /// Band half-width in standard deviations.
    pub bollinger_k: f64,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub adx_period: usize,
    pub mfi_period: usize,
    pub volume_sma_period: usize,
    pub momentum_lookback: usize,
    /// A bar is a pivot when it is the extreme of ±pivot_radius neighbors.
    pub pivot_radius: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_short: 9,
            ema_medium: 21,
            ema_long: 50,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_period: 14,
            bollinger_period: 20,
            bollinger_k: 2.0,
            stochastic_k: 14,
            stochastic_d: 3,
            adx_period: 14,
            mfi_period: 14,
            volume_sma_period: 20,
            momentum_lookback: 10,
            pivot_radius: 3,
        }
    }
}

/// Signal synthesis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalConfig {
    /// Minimum confidence to emit a BUY.
    pub min_confidence_buy: f64,
    /// Minimum confidence to emit a SELL.
    pub min_confidence_sell: f64,
    /// Bars of consistent EMA ordering before a trend regime is declared.
    pub regime_persistence: usize,
    /// Window for the ATR percentile rank behind volatility regimes.
    pub atr_percentile_lookback: usize,
    /// ATR percentile rank above which the regime is HighVolatility.
    pub atr_high_percentile: f64,
    /// ATR percentile rank below which the regime is LowVolatility.
    pub atr_low_percentile: f64,
    /// A support/resistance level counts when within this fraction of price.
    pub sr_proximity_pct: f64,
    /// Volume must exceed its rolling average by this ratio to confirm.
    pub volume_confirm_ratio: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_confidence_buy: 0.5,
            min_confidence_sell: 0.5,
            regime_persistence: 3,
            atr_percentile_lookback: 50,
            atr_high_percentile: 0.8,
            atr_low_percentile: 0.2,
            sr_proximity_pct: 0.02,
            volume_confirm_ratio: 1.2,
        }
    }
}

/// Risk management rules: stops, targets, trailing, sizing, daily limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// ATR multiple for the base stop distance.
    pub atr_stop_multiplier: f64,
    /// Regime overrides for the ATR multiple.
    pub high_vol_stop_multiplier: f64,
    pub low_vol_stop_multiplier: f64,
    pub trending_stop_multiplier: f64,

    /// Stop distance clamp band, as a fraction of entry price.
    pub min_stop_pct: f64,
    pub max_stop_pct: f64,

    /// Unrealized gain that activates the trailing stop (stop jumps to entry).
    pub breakeven_trigger_pct: f64,
    /// Trail distance behind the best price since entry, once active.
    pub trailing_pct: f64,

    /// Take-profit tiers as risk:reward multiples of the stop distance,
    /// ascending, paired with the fraction of remaining size each closes.
    pub tp_rr_ratios: Vec<f64>,
    pub tp_close_fractions: Vec<f64>,

    /// Capital fraction risked per trade before scaling.
    pub base_risk_pct: f64,
    /// Confidence scaling band for position size.
    pub size_scale_min: f64,
    pub size_scale_max: f64,
    /// Size multiplier applied in HighVolatility regime.
    pub high_vol_size_scale: f64,
    /// Size multiplier applied in Ranging regime.
    pub ranging_size_scale: f64,
    /// Hard cap on position notional as a fraction of current equity.
    pub max_position_pct: f64,

    /// Daily circuit breakers (calendar days, UTC).
    pub max_trades_per_day: usize,
    pub max_daily_loss_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            atr_stop_multiplier: 2.0,
            high_vol_stop_multiplier: 2.5,
            low_vol_stop_multiplier: 1.5,
            trending_stop_multiplier: 1.8,
            min_stop_pct: 0.02,
            max_stop_pct: 0.06,
            breakeven_trigger_pct: 0.02,
            trailing_pct: 0.015,
            tp_rr_ratios: vec![2.0, 3.5, 5.0],
            tp_close_fractions: vec![0.5, 0.3, 0.2],
            base_risk_pct: 0.015,
            size_scale_min: 0.3,
            size_scale_max: 1.5,
            high_vol_size_scale: 0.7,
            ranging_size_scale: 0.8,
            max_position_pct: 0.25,
            max_trades_per_day: 5,
            max_daily_loss_pct: 0.03,
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            slippage_rate: 0.0005,
            record_signals: false,
            indicators: IndicatorConfig::default(),
            signals: SignalConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl BacktestConfig {
    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Identical configs hash identically, so callers can use the RunId
    /// as a cache key for results.
    pub fn run_id(&self) -> RunId {
        // Serialization of a plain config struct cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Parse and validate a config from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Bars consumed before every indicator is warm. The simulator skips
    /// entries during this prefix.
    pub fn warmup_bars(&self) -> usize {
        let ind = &self.indicators;
        [
            ind.rsi_period + 1,
            ind.ema_long,
            ind.macd_slow + ind.macd_signal,
            ind.atr_period + 1,
            ind.bollinger_period,
            ind.stochastic_k + ind.stochastic_d,
            ind.adx_period * 2,
            ind.mfi_period + 1,
            ind.volume_sma_period,
            ind.momentum_lookback + 1,
            self.signals.atr_percentile_lookback,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Reject invalid configs before any computation runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        for (name, value) in [
            ("rsi_period", ind.rsi_period),
            ("ema_short", ind.ema_short),
            ("ema_medium", ind.ema_medium),
            ("ema_long", ind.ema_long),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
            ("atr_period", ind.atr_period),
            ("bollinger_period", ind.bollinger_period),
            ("stochastic_k", ind.stochastic_k),
            ("stochastic_d", ind.stochastic_d),
            ("adx_period", ind.adx_period),
            ("mfi_period", ind.mfi_period),
            ("volume_sma_period", ind.volume_sma_period),
            ("momentum_lookback", ind.momentum_lookback),
            ("pivot_radius", ind.pivot_radius),
            ("regime_persistence", self.signals.regime_persistence),
            ("atr_percentile_lookback", self.signals.atr_percentile_lookback),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidPeriod { name, value });
            }
        }

        if ind.ema_short >= ind.ema_medium || ind.ema_medium >= ind.ema_long {
            return Err(ConfigError::PeriodOrdering {
                detail: "ema_short < ema_medium < ema_long required",
            });
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(ConfigError::PeriodOrdering {
                detail: "macd_fast < macd_slow required",
            });
        }

        for (name, value) in [
            ("min_confidence_buy", self.signals.min_confidence_buy),
            ("min_confidence_sell", self.signals.min_confidence_sell),
            ("atr_high_percentile", self.signals.atr_high_percentile),
            ("atr_low_percentile", self.signals.atr_low_percentile),
            ("commission_rate", self.commission_rate),
            ("slippage_rate", self.slippage_rate),
            ("max_daily_loss_pct", self.risk.max_daily_loss_pct),
            ("base_risk_pct", self.risk.base_risk_pct),
            ("max_position_pct", self.risk.max_position_pct),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("initial_capital", self.initial_capital),
            ("atr_stop_multiplier", self.risk.atr_stop_multiplier),
            ("high_vol_stop_multiplier", self.risk.high_vol_stop_multiplier),
            ("low_vol_stop_multiplier", self.risk.low_vol_stop_multiplier),
            ("trending_stop_multiplier", self.risk.trending_stop_multiplier),
            ("min_stop_pct", self.risk.min_stop_pct),
            ("max_stop_pct", self.risk.max_stop_pct),
            ("breakeven_trigger_pct", self.risk.breakeven_trigger_pct),
            ("trailing_pct", self.risk.trailing_pct),
            ("base_risk_pct", self.risk.base_risk_pct),
            ("size_scale_min", self.risk.size_scale_min),
            ("size_scale_max", self.risk.size_scale_max),
            ("high_vol_size_scale", self.risk.high_vol_size_scale),
            ("ranging_size_scale", self.risk.ranging_size_scale),
            ("max_position_pct", self.risk.max_position_pct),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.risk.min_stop_pct > self.risk.max_stop_pct {
            return Err(ConfigError::StopBandInverted {
                min: self.risk.min_stop_pct,
                max: self.risk.max_stop_pct,
            });
        }
        if self.risk.size_scale_min > self.risk.size_scale_max {
            return Err(ConfigError::PeriodOrdering {
                detail: "size_scale_min <= size_scale_max required",
            });
        }

        let risk = &self.risk;
        if risk.tp_rr_ratios.is_empty() || risk.tp_rr_ratios.len() != risk.tp_close_fractions.len()
        {
            return Err(ConfigError::MalformedTiers {
                detail: "tp_rr_ratios and tp_close_fractions must be equal-length and non-empty",
            });
        }
        if risk.tp_rr_ratios.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::MalformedTiers {
                detail: "tp_rr_ratios must be strictly ascending",
            });
        }
        if risk
            .tp_close_fractions
            .iter()
            .any(|&f| !(0.0..=1.0).contains(&f) || f == 0.0)
        {
            return Err(ConfigError::MalformedTiers {
                detail: "tp_close_fractions must lie in (0, 1]",
            });
        }
        if self.risk.max_trades_per_day == 0 {
            return Err(ConfigError::InvalidPeriod {
                name: "max_trades_per_day",
                value: 0,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(BacktestConfig::default().validate(), Ok(()));
    }

    #[test]
    fn run_id_deterministic() {
        let config = BacktestConfig::default();
        let id1 = config.run_id();
        let id2 = config.run_id();
        assert_eq!(id1, id2, "RunId should be deterministic");
        assert!(!id1.is_empty());
    }

    #[test]
    fn run_id_changes_with_params() {
        let config1 = BacktestConfig::default();
        let mut config2 = config1.clone();
        config2.indicators.rsi_period = 21;
        assert_ne!(config1.run_id(), config2.run_id());
    }

    #[test]
    fn rejects_zero_period() {
        let mut config = BacktestConfig::default();
        config.indicators.rsi_period = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPeriod { name: "rsi_period", value: 0 })
        );
    }

    #[test]
    fn rejects_unordered_emas() {
        let mut config = BacktestConfig::default();
        config.indicators.ema_short = 50;
        assert!(matches!(config.validate(), Err(ConfigError::PeriodOrdering { .. })));
    }

    #[test]
    fn rejects_inverted_stop_band() {
        let mut config = BacktestConfig::default();
        config.risk.min_stop_pct = 0.08;
        assert!(matches!(config.validate(), Err(ConfigError::StopBandInverted { .. })));
    }

    #[test]
    fn rejects_confidence_above_one() {
        let mut config = BacktestConfig::default();
        config.signals.min_confidence_buy = 1.2;
        assert!(matches!(config.validate(), Err(ConfigError::FractionOutOfRange { .. })));
    }

    #[test]
    fn rejects_non_ascending_tiers() {
        let mut config = BacktestConfig::default();
        config.risk.tp_rr_ratios = vec![2.0, 2.0, 5.0];
        assert!(matches!(config.validate(), Err(ConfigError::MalformedTiers { .. })));
    }

    #[test]
    fn warmup_covers_longest_lookback() {
        let config = BacktestConfig::default();
        let warmup = config.warmup_bars();
        assert!(warmup >= config.indicators.ema_long);
        assert!(warmup >= config.signals.atr_percentile_lookback);
    }

    #[test]
    fn toml_roundtrip_with_validation() {
        let config = BacktestConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = BacktestConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn invalid_toml_rejected() {
        let err = BacktestConfig::from_toml_str("initial_capital = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = BacktestConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: BacktestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
