//! StratLab Runner — backtest orchestration, metrics, and parameter search.
//!
//! This crate builds on `stratlab-core` to provide:
//! - Single-backtest runner with metrics and a buy-and-hold benchmark
//! - Performance metrics (returns, risk, drawdown, trade statistics)
//! - Objective scoring for candidate ranking
//! - Grid, genetic, and walk-forward parameter search
//! - Parameter sensitivity analysis
//! - JSON/CSV result export

pub mod export;
pub mod metrics;
pub mod objective;
pub mod optimize;
pub mod runner;
pub mod sensitivity;

pub use export::{export_equity_csv, export_json, export_trades_csv, import_json, save_artifacts};
pub use metrics::PerformanceMetrics;
pub use objective::Objective;
pub use optimize::{
    Candidate, GeneticSearch, GridSearch, OptimizationResult, OptimizeError, ParameterRange,
    ParameterSet, RangeKind, WalkForward, WalkForwardResult, WalkForwardWindow,
};
pub use optimize::walk_forward::WalkForwardError;
pub use runner::{run_backtest, BacktestResult, RunError};
pub use sensitivity::parameter_sensitivity;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn search_types_are_send_sync() {
        assert_send::<GridSearch>();
        assert_sync::<GridSearch>();
        assert_send::<GeneticSearch>();
        assert_sync::<GeneticSearch>();
        assert_send::<WalkForward>();
        assert_sync::<WalkForward>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<OptimizationResult>();
        assert_sync::<OptimizationResult>();
        assert_send::<WalkForwardResult>();
        assert_sync::<WalkForwardResult>();
        assert_send::<Candidate>();
        assert_sync::<Candidate>();
    }

    #[test]
    fn objective_is_send_sync() {
        assert_send::<Objective>();
        assert_sync::<Objective>();
    }
}
