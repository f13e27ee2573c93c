//! Objective function — configurable metric selector for candidate ranking.

use serde::{Deserialize, Serialize};

use crate::metrics::PerformanceMetrics;

/// Composite weights: reward risk-adjusted and raw return, nudge toward
/// consistency, penalize drawdown.
const W_SHARPE: f64 = 0.4;
const W_RETURN: f64 = 0.3;
const W_WIN_RATE: f64 = 0.2;
const W_DRAWDOWN: f64 = 0.1;

/// Which metric a parameter search optimizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Objective {
    #[default]
    Sharpe,
    Sortino,
    Calmar,
    TotalReturn,
    AnnualizedReturn,
    WinRate,
    ProfitFactor,
    MaxDrawdown,
    /// Weighted blend of Sharpe, return, win rate, and drawdown.
    Composite,
}

impl Objective {
    /// Extract the score from a metrics record. Higher is always better:
    /// MaxDrawdown scores are negative fractions, so less-negative wins.
    pub fn extract(&self, metrics: &PerformanceMetrics) -> f64 {
        match self {
            Self::Sharpe => metrics.sharpe,
            Self::Sortino => metrics.sortino,
            Self::Calmar => metrics.calmar,
            Self::TotalReturn => metrics.total_return,
            Self::AnnualizedReturn => metrics.annualized_return,
            Self::WinRate => metrics.win_rate,
            Self::ProfitFactor => metrics.profit_factor,
            Self::MaxDrawdown => metrics.max_drawdown,
            Self::Composite => {
                W_SHARPE * metrics.sharpe + W_RETURN * metrics.total_return
                    + W_WIN_RATE * metrics.win_rate
                    - W_DRAWDOWN * metrics.max_drawdown.abs()
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            total_return: 0.15,
            annualized_return: 0.12,
            volatility: 0.2,
            sharpe: 1.5,
            sortino: 2.0,
            calmar: 1.2,
            max_drawdown: -0.10,
            var_95: -0.02,
            expected_shortfall: -0.03,
            win_rate: 0.55,
            profit_factor: 1.8,
            trade_count: 20,
            avg_win: 50.0,
            avg_loss: -30.0,
            best_trade: 120.0,
            worst_trade: -80.0,
            avg_bars_held: 12.0,
        }
    }

    #[test]
    fn extract_single_metrics() {
        let m = sample_metrics();
        assert!((Objective::Sharpe.extract(&m) - 1.5).abs() < 1e-10);
        assert!((Objective::MaxDrawdown.extract(&m) - (-0.10)).abs() < 1e-10);
        assert!((Objective::WinRate.extract(&m) - 0.55).abs() < 1e-10);
    }

    #[test]
    fn composite_blend() {
        let m = sample_metrics();
        let expected = 0.4 * 1.5 + 0.3 * 0.15 + 0.2 * 0.55 - 0.1 * 0.10;
        assert!((Objective::Composite.extract(&m) - expected).abs() < 1e-10);
    }

    #[test]
    fn composite_punishes_drawdown() {
        let m = sample_metrics();
        let mut worse = sample_metrics();
        worse.max_drawdown = -0.50;
        assert!(Objective::Composite.extract(&m) > Objective::Composite.extract(&worse));
    }

    #[test]
    fn default_is_sharpe() {
        assert_eq!(Objective::default(), Objective::Sharpe);
    }
}
