//! Walk-forward optimization — rolling in-sample search, out-of-sample scoring.
//!
//! The bar history is split into rolling windows: each window tunes
//! parameters on an optimize slice, then applies the winner unmodified to
//! the test slice that immediately follows. Windows step forward by
//! `test_bars`, so the test slices tile the history with no overlap.
//! The spread between in-sample and out-of-sample scores is the
//! overfitting signal this module exists to expose.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use stratlab_core::{BacktestConfig, Bar};

use super::grid::GridSearch;
use super::{OptimizeError, ParameterSet};
use crate::objective::Objective;
use crate::runner::{run_backtest, RunError};

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("insufficient data: {total_bars} bars, need at least {needed}")]
    InsufficientData { total_bars: usize, needed: usize },
    #[error("in-sample search failed on window {window}: {source}")]
    Search {
        window: usize,
        #[source]
        source: OptimizeError,
    },
    #[error("out-of-sample backtest failed on window {window}: {source}")]
    Run {
        window: usize,
        #[source]
        source: RunError,
    },
}

/// One completed window: where it sat in the history, what the in-sample
/// search picked, and how that pick scored on both sides of the split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardWindow {
    pub index: usize,
    /// Optimize slice start bar (inclusive).
    pub optimize_start: usize,
    /// Optimize slice end bar (exclusive); the test slice starts here.
    pub optimize_end: usize,
    /// Test slice end bar (exclusive).
    pub test_end: usize,
    pub best_params: ParameterSet,
    pub in_sample_score: f64,
    pub out_of_sample_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardResult {
    pub windows: Vec<WalkForwardWindow>,
    pub mean_in_sample_score: f64,
    pub mean_out_of_sample_score: f64,
    /// Mean OOS score / mean IS score. `None` when the IS mean is not a
    /// positive finite number, where the ratio would mislead.
    pub degradation_ratio: Option<f64>,
    /// Population variance of the chosen value per parameter across
    /// windows. A parameter that jumps around between windows is fit to
    /// noise, not signal.
    pub parameter_stability: BTreeMap<String, f64>,
}

/// Rolling walk-forward driver around an inner grid search.
#[derive(Debug, Clone)]
pub struct WalkForward {
    pub search: GridSearch,
    /// Bars in each in-sample optimize slice.
    pub optimize_bars: usize,
    /// Bars in each out-of-sample test slice; also the step size.
    pub test_bars: usize,
}

impl WalkForward {
    pub fn new(search: GridSearch, optimize_bars: usize, test_bars: usize) -> Self {
        Self { search, optimize_bars, test_bars }
    }

    pub fn run(
        &self,
        base: &BacktestConfig,
        bars: &[Bar],
        objective: Objective,
    ) -> Result<WalkForwardResult, WalkForwardError> {
        let needed = self.optimize_bars + self.test_bars;
        if self.optimize_bars == 0 || self.test_bars == 0 || bars.len() < needed {
            return Err(WalkForwardError::InsufficientData {
                total_bars: bars.len(),
                needed: needed.max(2),
            });
        }

        let mut windows = Vec::new();
        let mut index = 0usize;
        loop {
            let optimize_start = index * self.test_bars;
            let optimize_end = optimize_start + self.optimize_bars;
            let test_end = optimize_end + self.test_bars;
            if test_end > bars.len() {
                break;
            }

            let in_sample =
                self.search.run(base, &bars[optimize_start..optimize_end], objective).map_err(
                    |source| WalkForwardError::Search { window: index, source },
                )?;

            // The winner is applied to the test slice with no re-tuning;
            // apply_to already succeeded in-sample so cannot fail here,
            // but the error path stays explicit.
            let config = in_sample.best.params.apply_to(base).map_err(|source| {
                WalkForwardError::Search { window: index, source }
            })?;
            let oos = run_backtest(&config, &bars[optimize_end..test_end])
                .map_err(|source| WalkForwardError::Run { window: index, source })?;
            let out_of_sample_score = objective.extract(&oos.metrics);

            debug!(
                window = index,
                in_sample = in_sample.best.score,
                out_of_sample = out_of_sample_score,
                "window complete"
            );
            windows.push(WalkForwardWindow {
                index,
                optimize_start,
                optimize_end,
                test_end,
                best_params: in_sample.best.params,
                in_sample_score: in_sample.best.score,
                out_of_sample_score,
            });
            index += 1;
        }

        if windows.is_empty() {
            return Err(WalkForwardError::InsufficientData {
                total_bars: bars.len(),
                needed,
            });
        }
        Ok(summarize(windows))
    }
}

fn summarize(windows: Vec<WalkForwardWindow>) -> WalkForwardResult {
    let n = windows.len() as f64;
    let mean_is = windows.iter().map(|w| w.in_sample_score).sum::<f64>() / n;
    let mean_oos = windows.iter().map(|w| w.out_of_sample_score).sum::<f64>() / n;

    let degradation_ratio = if mean_is.is_finite() && mean_is > 0.0 {
        Some(mean_oos / mean_is)
    } else {
        None
    };

    WalkForwardResult {
        parameter_stability: parameter_stability(&windows),
        windows,
        mean_in_sample_score: mean_is,
        mean_out_of_sample_score: mean_oos,
        degradation_ratio,
    }
}

/// Per-parameter population variance of the winning value across windows.
fn parameter_stability(windows: &[WalkForwardWindow]) -> BTreeMap<String, f64> {
    let mut stability = BTreeMap::new();
    let Some(first) = windows.first() else {
        return stability;
    };
    for name in first.best_params.values.keys() {
        let values: Vec<f64> =
            windows.iter().filter_map(|w| w.best_params.get(name)).collect();
        if values.is_empty() {
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        stability.insert(name.clone(), variance);
    }
    stability
}
