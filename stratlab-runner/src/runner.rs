//! Single-backtest orchestration: config + bars in, scored result out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stratlab_core::{
    Bar, BacktestConfig, ConfigError, DataError, EquityPoint, PortfolioSimulator, RunId,
    SignalEvent, TradeRecord,
};

use crate::metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Everything a single backtest produced, serializable for downstream
/// reporting collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub config: BacktestConfig,
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    /// Populated only when the config sets `record_signals`.
    pub signals: Vec<SignalEvent>,
    pub final_equity: f64,
    /// Buy-and-hold return over the same bars.
    pub buy_hold_return: f64,
    /// Strategy total return minus buy-and-hold.
    pub excess_return: f64,
}

/// Run one backtest: validate the config, simulate, compute metrics and
/// the buy-and-hold benchmark.
pub fn run_backtest(config: &BacktestConfig, bars: &[Bar]) -> Result<BacktestResult, RunError> {
    config.validate()?;

    let output = PortfolioSimulator::new(config).run(bars)?;
    let metrics = PerformanceMetrics::compute(&output.equity_curve, &output.trades);

    let buy_hold = buy_hold_return(bars);
    let excess = metrics.total_return - buy_hold;

    Ok(BacktestResult {
        run_id: config.run_id(),
        config: config.clone(),
        metrics,
        equity_curve: output.equity_curve,
        trades: output.trades,
        signals: output.signals,
        final_equity: output.final_equity,
        buy_hold_return: buy_hold,
        excess_return: excess,
    })
}

/// First-close to last-close return of the bars themselves.
fn buy_hold_return(bars: &[Bar]) -> f64 {
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) if first.close > 0.0 => last.close / first.close - 1.0,
        _ => 0.0,
    }
}
