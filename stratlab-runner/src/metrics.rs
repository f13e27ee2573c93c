//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in,
//! scalar out. Annualization is calendar-based: the periods-per-year factor
//! comes from the curve's own timestamps, so hourly and daily bars both
//! scale correctly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stratlab_core::{EquityPoint, TradeRecord};

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    /// Annualized standard deviation of periodic returns.
    pub volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    /// Negative fraction in [-1, 0].
    pub max_drawdown: f64,
    /// 5th percentile of periodic returns.
    pub var_95: f64,
    /// Mean of the returns at or below `var_95`.
    pub expected_shortfall: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub trade_count: usize,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_bars_held: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve and trade list.
    pub fn compute(equity_curve: &[EquityPoint], trades: &[TradeRecord]) -> Self {
        let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let times: Vec<DateTime<Utc>> = equity_curve.iter().map(|p| p.timestamp).collect();
        let returns = periodic_returns(&equity);
        let ppy = periods_per_year(&times);
        let years = elapsed_years(&times);

        let total = total_return(&equity);
        let annualized = annualized_return(total, years);
        let dd = max_drawdown(&equity);
        let var = var_95(&returns);

        Self {
            total_return: total,
            annualized_return: annualized,
            volatility: std_dev(&returns) * ppy.sqrt(),
            sharpe: sharpe_ratio(&returns, ppy),
            sortino: sortino_ratio(&returns, ppy),
            calmar: calmar_ratio(annualized, dd),
            max_drawdown: dd,
            var_95: var,
            expected_shortfall: expected_shortfall(&returns, var),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            trade_count: trades.len(),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            best_trade: trades.iter().map(|t| t.net_pnl).fold(0.0, f64::max),
            worst_trade: trades.iter().map(|t| t.net_pnl).fold(0.0, f64::min),
            avg_bars_held: avg_bars_held(trades),
        }
    }
}

// ─── Curve metrics ──────────────────────────────────────────────────

/// Per-period simple returns of the equity curve.
pub fn periodic_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Periods per calendar year, inferred from the mean timestamp spacing.
/// Falls back to 0.0 when the curve spans no time.
pub fn periods_per_year(times: &[DateTime<Utc>]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }
    let span = (times[times.len() - 1] - times[0]).num_seconds() as f64;
    if span <= 0.0 {
        return 0.0;
    }
    let mean_spacing = span / (times.len() - 1) as f64;
    SECONDS_PER_YEAR / mean_spacing
}

/// Calendar years covered by the curve.
pub fn elapsed_years(times: &[DateTime<Utc>]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }
    (times[times.len() - 1] - times[0]).num_seconds() as f64 / SECONDS_PER_YEAR
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let initial = equity[0];
    let final_eq = equity[equity.len() - 1];
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Geometric annualization over calendar time: (1 + r)^(1/years) - 1.
/// Returns the raw total when the curve spans less than a day.
pub fn annualized_return(total: f64, years: f64) -> f64 {
    if years <= 1.0 / 365.25 || total <= -1.0 {
        return total;
    }
    (1.0 + total).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe ratio at zero risk-free rate.
/// Returns 0.0 when the return variance vanishes.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let std = std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
/// Returns 0.0 when there are no negative returns.
pub fn sortino_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let downside_sq: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).collect();
    if downside_sq.is_empty() {
        return 0.0;
    }
    let downside_std = (downside_sq.iter().sum::<f64>() / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean / downside_std) * periods_per_year.sqrt()
}

/// Calmar ratio: annualized return / |max drawdown|.
/// Returns 0.0 when the drawdown is zero.
pub fn calmar_ratio(annualized: f64, max_dd: f64) -> f64 {
    if max_dd >= 0.0 {
        return 0.0;
    }
    annualized / max_dd.abs()
}

/// Maximum drawdown as a negative fraction (e.g. -0.15 = 15% drawdown).
/// Returns 0.0 for constant or monotonically rising equity.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Value at Risk at 95%: the 5th percentile of periodic returns.
pub fn var_95(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    // Empirical lower quantile: the smallest return r with at least 5% of
    // the sample at or below r.
    let idx = ((sorted.len() as f64) * 0.05).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}

/// Expected shortfall: mean of the returns at or below the VaR cutoff.
pub fn expected_shortfall(returns: &[f64], var: f64) -> f64 {
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    if tail.is_empty() {
        return 0.0;
    }
    mean_f64(&tail)
}

// ─── Trade metrics ──────────────────────────────────────────────────

/// Fraction of trades with positive net P&L. 0.0 with no trades.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_win()).count() as f64 / trades.len() as f64
}

/// Gross profit over gross loss.
/// No trades → 0.0; profits with zero losses → +∞.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.net_pnl > 0.0).map(|t| t.net_pnl).sum();
    let gross_loss: f64 = -trades.iter().filter(|t| t.net_pnl < 0.0).map(|t| t.net_pnl).sum::<f64>();
    if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_profit / gross_loss
    }
}

/// Mean net P&L of winning trades. 0.0 with no winners.
pub fn avg_win(trades: &[TradeRecord]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.net_pnl).collect();
    if wins.is_empty() {
        0.0
    } else {
        mean_f64(&wins)
    }
}

/// Mean net P&L of losing trades (negative). 0.0 with no losers.
pub fn avg_loss(trades: &[TradeRecord]) -> f64 {
    let losses: Vec<f64> =
        trades.iter().filter(|t| t.net_pnl < 0.0).map(|t| t.net_pnl).collect();
    if losses.is_empty() {
        0.0
    } else {
        mean_f64(&losses)
    }
}

/// Mean holding period in bars, counted per close event.
pub fn avg_bars_held(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
