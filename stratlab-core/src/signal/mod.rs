//! Signal synthesis: regime classification, rule scoring, divergence.

pub mod divergence;
pub mod regime;
pub mod rules;

pub use divergence::{detect_divergence, Divergence};
pub use regime::classify_regime;
pub use rules::{RuleContext, RULES};

use crate::config::SignalConfig;
use crate::domain::{Bar, Direction, Signal, SignalFactor, SignalStrength};
use crate::indicators::IndicatorSeries;

/// Confidence ceiling: the scores never claim certainty.
const CONFIDENCE_CAP: f64 = 0.95;

/// Turns precomputed indicator series into per-bar trading signals.
pub struct SignalGenerator<'a> {
    config: &'a SignalConfig,
}

impl<'a> SignalGenerator<'a> {
    pub fn new(config: &'a SignalConfig) -> Self {
        Self { config }
    }

    /// The signal at bar `index`. HOLD before warm-up and whenever the
    /// winning side's confidence misses its threshold.
    pub fn generate(&self, bars: &[Bar], series: &IndicatorSeries, index: usize) -> Signal {
        let bar = &bars[index];
        let snapshot = series.snapshot(index);
        let regime = classify_regime(series, index, self.config);

        if !snapshot.is_warm() {
            return Signal::hold(bar.timestamp, regime);
        }

        let divergence = detect_divergence(bars, series, index);
        let ctx = RuleContext {
            bar,
            snapshot: &snapshot,
            regime,
            divergence,
            config: self.config,
        };

        let mut bull_score = 0.0;
        let mut bear_score = 0.0;
        let mut fired: Vec<(&'static str, f64, bool)> = Vec::new();
        for rule in RULES {
            if (rule.bull)(&ctx) {
                bull_score += rule.weight;
                fired.push((rule.name, rule.weight, true));
            }
            if (rule.bear)(&ctx) {
                bear_score += rule.weight;
                fired.push((rule.name, rule.weight, false));
            }
        }

        let total = bull_score + bear_score;
        if total == 0.0 {
            return Signal::hold(bar.timestamp, regime);
        }

        let bullish_wins = bull_score >= bear_score;
        let winner = bull_score.max(bear_score);
        let confidence = (winner / total).min(CONFIDENCE_CAP);

        let threshold = if bullish_wins {
            self.config.min_confidence_buy
        } else {
            self.config.min_confidence_sell
        };
        let direction = if confidence < threshold {
            Direction::Hold
        } else if bullish_wins {
            Direction::Buy
        } else {
            Direction::Sell
        };

        // Signed against the winning side for the audit trail.
        let factors = fired
            .into_iter()
            .map(|(name, weight, bull)| SignalFactor {
                name: name.to_string(),
                contribution: if bull == bullish_wins { weight } else { -weight },
            })
            .collect();

        Signal {
            timestamp: bar.timestamp,
            direction,
            confidence,
            strength: SignalStrength::from_confidence(confidence),
            regime,
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorConfig;
    use crate::domain::MarketRegime;
    use crate::indicators::make_bars;

    fn signal_at_end(closes: &[f64]) -> Signal {
        let bars = make_bars(closes);
        let series = IndicatorSeries::compute(&bars, &IndicatorConfig::default());
        let config = SignalConfig::default();
        SignalGenerator::new(&config).generate(&bars, &series, closes.len() - 1)
    }

    #[test]
    fn strong_uptrend_signals_buy() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let signal = signal_at_end(&closes);
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.confidence >= 0.5);
        assert_eq!(signal.regime, MarketRegime::TrendingUp);
        assert!(signal.factors.iter().any(|f| f.name == "trend_alignment"));
    }

    #[test]
    fn strong_downtrend_signals_sell() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 0.996f64.powi(i)).collect();
        let signal = signal_at_end(&closes);
        assert_eq!(signal.direction, Direction::Sell);
        assert_eq!(signal.regime, MarketRegime::TrendingDown);
    }

    #[test]
    fn flat_market_holds() {
        let closes = vec![100.0; 200];
        let signal = signal_at_end(&closes);
        assert_eq!(signal.direction, Direction::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert!(signal.factors.is_empty());
    }

    #[test]
    fn pre_warmup_holds() {
        let bars = make_bars(&(0..200).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let series = IndicatorSeries::compute(&bars, &IndicatorConfig::default());
        let config = SignalConfig::default();
        let signal = SignalGenerator::new(&config).generate(&bars, &series, 5);
        assert_eq!(signal.direction, Direction::Hold);
    }

    #[test]
    fn confidence_is_capped() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let signal = signal_at_end(&closes);
        assert!(signal.confidence <= 0.95);
    }

    #[test]
    fn losing_factors_are_negative() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let signal = signal_at_end(&closes);
        // RSI stays pinned overbought in a relentless rally: a bear factor
        // recorded against the buy.
        let rsi_factor = signal.factors.iter().find(|f| f.name == "rsi_zone");
        if let Some(f) = rsi_factor {
            assert!(f.contribution < 0.0);
        }
    }
}
