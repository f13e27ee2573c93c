//! Market regime classification.
//!
//! Trend first: short > medium > long EMA (or the mirror) held for
//! `regime_persistence` consecutive bars. Then volatility from the ATR's
//! percentile rank within its own recent window. Ranging otherwise.

use crate::config::SignalConfig;
use crate::domain::MarketRegime;
use crate::indicators::IndicatorSeries;

pub fn classify_regime(
    series: &IndicatorSeries,
    index: usize,
    config: &SignalConfig,
) -> MarketRegime {
    if let Some(trend) = trend_regime(series, index, config.regime_persistence) {
        return trend;
    }

    match atr_percentile(series, index, config.atr_percentile_lookback) {
        Some(rank) if rank > config.atr_high_percentile => MarketRegime::HighVolatility,
        Some(rank) if rank < config.atr_low_percentile => MarketRegime::LowVolatility,
        _ => MarketRegime::Ranging,
    }
}

/// TrendingUp/Down when the EMA ordering has held for `persistence` bars
/// ending at `index`; None otherwise.
fn trend_regime(series: &IndicatorSeries, index: usize, persistence: usize) -> Option<MarketRegime> {
    if index + 1 < persistence {
        return None;
    }
    let ordered_up = |i: usize| {
        let (s, m, l) = (series.ema_short[i], series.ema_medium[i], series.ema_long[i]);
        s.is_finite() && m.is_finite() && l.is_finite() && s > m && m > l
    };
    let ordered_down = |i: usize| {
        let (s, m, l) = (series.ema_short[i], series.ema_medium[i], series.ema_long[i]);
        s.is_finite() && m.is_finite() && l.is_finite() && s < m && m < l
    };

    let mut window = (index + 1 - persistence)..=index;
    if window.clone().all(ordered_up) {
        Some(MarketRegime::TrendingUp)
    } else if window.all(ordered_down) {
        Some(MarketRegime::TrendingDown)
    } else {
        None
    }
}

/// Mid-rank percentile of the current ATR within its trailing `lookback`
/// window (ties count half, so a constant ATR ranks at 0.5, not 1.0).
/// None until the window holds at least half its span.
fn atr_percentile(series: &IndicatorSeries, index: usize, lookback: usize) -> Option<f64> {
    let current = series.atr[index];
    if !current.is_finite() || index + 1 < lookback {
        return None;
    }
    let window: Vec<f64> = series.atr[index + 1 - lookback..=index]
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if window.len() < lookback / 2 {
        return None;
    }
    let below = window.iter().filter(|&&v| v < current).count();
    let equal = window.iter().filter(|&&v| v == current).count();
    Some((below as f64 + 0.5 * equal as f64) / window.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorConfig;
    use crate::indicators::make_bars;

    fn series_from(closes: &[f64]) -> IndicatorSeries {
        IndicatorSeries::compute(&make_bars(closes), &IndicatorConfig::default())
    }

    #[test]
    fn steady_rise_classifies_trending_up() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 * 1.005f64.powi(i)).collect();
        let series = series_from(&closes);
        let config = SignalConfig::default();
        assert_eq!(classify_regime(&series, 140, &config), MarketRegime::TrendingUp);
    }

    #[test]
    fn steady_fall_classifies_trending_down() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 * 0.995f64.powi(i)).collect();
        let series = series_from(&closes);
        let config = SignalConfig::default();
        assert_eq!(classify_regime(&series, 140, &config), MarketRegime::TrendingDown);
    }

    #[test]
    fn flat_series_is_not_trending() {
        let closes = vec![100.0; 150];
        let series = series_from(&closes);
        let config = SignalConfig::default();
        let regime = classify_regime(&series, 140, &config);
        assert!(!matches!(regime, MarketRegime::TrendingUp | MarketRegime::TrendingDown));
    }

    #[test]
    fn volatility_burst_reads_high_volatility() {
        // Quiet prefix, then alternating swings pump the ATR into its top
        // percentile while the EMAs interleave.
        let mut closes = vec![100.0; 120];
        for i in 0..30 {
            closes.push(if i % 2 == 0 { 112.0 } else { 92.0 });
        }
        let series = series_from(&closes);
        let config = SignalConfig::default();
        assert_eq!(
            classify_regime(&series, closes.len() - 1, &config),
            MarketRegime::HighVolatility
        );
    }

    #[test]
    fn early_bars_default_to_ranging() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = series_from(&closes);
        let config = SignalConfig::default();
        assert_eq!(classify_regime(&series, 5, &config), MarketRegime::Ranging);
    }
}
