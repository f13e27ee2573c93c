//! Parameter search: shared candidate evaluation for grid, genetic, and
//! walk-forward strategies.
//!
//! All three strategies funnel through `score_candidates`: evaluations run
//! in parallel on rayon, results are collected and then sorted, so arrival
//! order never affects the ranking. A candidate that fails to evaluate is
//! scored at negative infinity and counted, never propagated as an error;
//! the search only fails when every candidate does.

pub mod genetic;
pub mod grid;
pub mod walk_forward;

pub use genetic::GeneticSearch;
pub use grid::GridSearch;
pub use walk_forward::{WalkForward, WalkForwardResult, WalkForwardWindow};

use std::collections::BTreeMap;

use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use stratlab_core::{BacktestConfig, Bar, ConfigError};

use crate::metrics::PerformanceMetrics;
use crate::objective::Objective;
use crate::runner::run_backtest;
use crate::sensitivity::parameter_sensitivity;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("unknown tunable parameter '{name}'")]
    UnknownParameter { name: String },
    #[error("no parameter ranges provided")]
    NoParameters,
    #[error("all {failed} candidates failed to evaluate")]
    AllCandidatesFailed { failed: usize },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// One tunable dimension of the search space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterRange {
    pub name: String,
    pub kind: RangeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeKind {
    /// Inclusive integer range walked by `step`.
    Int { min: i64, max: i64, step: i64 },
    /// `steps` evenly spaced points across [min, max].
    Float { min: f64, max: f64, steps: usize },
}

impl ParameterRange {
    pub fn int(name: &str, min: i64, max: i64, step: i64) -> Self {
        Self { name: name.to_string(), kind: RangeKind::Int { min, max, step } }
    }

    pub fn float(name: &str, min: f64, max: f64, steps: usize) -> Self {
        Self { name: name.to_string(), kind: RangeKind::Float { min, max, steps } }
    }

    /// The discretized grid points of this range.
    pub fn values(&self) -> Vec<f64> {
        match self.kind {
            RangeKind::Int { min, max, step } => {
                let step = step.max(1);
                (min..=max).step_by(step as usize).map(|v| v as f64).collect()
            }
            RangeKind::Float { min, max, steps } => {
                // Inverted bounds are degenerate, same as an empty Int range.
                if max < min {
                    return Vec::new();
                }
                match steps {
                    0 => Vec::new(),
                    1 => vec![min],
                    _ => (0..steps)
                        .map(|i| min + (max - min) * i as f64 / (steps - 1) as f64)
                        .collect(),
                }
            }
        }
    }

    /// A uniform random point, used by mutation and population seeding.
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        match self.kind {
            RangeKind::Int { min, max, .. } => rng.gen_range(min..=max) as f64,
            RangeKind::Float { min, max, .. } => rng.gen_range(min..=max),
        }
    }
}

/// One point in the search space: parameter name → value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub values: BTreeMap<String, f64>,
}

impl ParameterSet {
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Overlay these parameters onto a base config. Integer-valued fields
    /// round; unknown names are rejected so typos fail loudly instead of
    /// silently tuning nothing.
    pub fn apply_to(&self, base: &BacktestConfig) -> Result<BacktestConfig, OptimizeError> {
        let mut config = base.clone();
        for (name, &value) in &self.values {
            let period = value.round().max(1.0) as usize;
            match name.as_str() {
                "rsi_period" => config.indicators.rsi_period = period,
                "ema_short" => config.indicators.ema_short = period,
                "ema_medium" => config.indicators.ema_medium = period,
                "ema_long" => config.indicators.ema_long = period,
                "macd_fast" => config.indicators.macd_fast = period,
                "macd_slow" => config.indicators.macd_slow = period,
                "macd_signal" => config.indicators.macd_signal = period,
                "atr_period" => config.indicators.atr_period = period,
                "bollinger_period" => config.indicators.bollinger_period = period,
                "volume_sma_period" => config.indicators.volume_sma_period = period,
                "momentum_lookback" => config.indicators.momentum_lookback = period,
                "min_confidence" => {
                    config.signals.min_confidence_buy = value;
                    config.signals.min_confidence_sell = value;
                }
                "regime_persistence" => config.signals.regime_persistence = period,
                "atr_stop_multiplier" => config.risk.atr_stop_multiplier = value,
                "breakeven_trigger_pct" => config.risk.breakeven_trigger_pct = value,
                "trailing_pct" => config.risk.trailing_pct = value,
                "base_risk_pct" => config.risk.base_risk_pct = value,
                "max_trades_per_day" => config.risk.max_trades_per_day = period,
                _ => {
                    return Err(OptimizeError::UnknownParameter { name: name.clone() });
                }
            }
        }
        Ok(config)
    }
}

/// One evaluated candidate. Failures carry a -inf score and no metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub params: ParameterSet,
    pub score: f64,
    pub metrics: Option<PerformanceMetrics>,
}

impl Candidate {
    pub fn failed(&self) -> bool {
        self.score == f64::NEG_INFINITY
    }
}

/// Ranked output of a completed search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best candidate; ranked[0].
    pub best: Candidate,
    /// All evaluated candidates, best first. Failed candidates sink to
    /// the bottom.
    pub ranked: Vec<Candidate>,
    pub evaluations: usize,
    pub failed: usize,
    /// |Pearson correlation| between each parameter and the score.
    pub sensitivity: BTreeMap<String, f64>,
}

/// Evaluate every candidate in parallel. Returns the candidates unranked
/// plus the failure count.
pub(crate) fn score_candidates(
    sets: &[ParameterSet],
    base: &BacktestConfig,
    bars: &[Bar],
    objective: Objective,
) -> Vec<Candidate> {
    sets.par_iter()
        .map(|params| match evaluate_one(params, base, bars, objective) {
            Ok((score, metrics)) => Candidate { params: params.clone(), score, metrics: Some(metrics) },
            Err(reason) => {
                warn!(%reason, ?params, "candidate failed, scoring at -inf");
                Candidate { params: params.clone(), score: f64::NEG_INFINITY, metrics: None }
            }
        })
        .collect()
}

fn evaluate_one(
    params: &ParameterSet,
    base: &BacktestConfig,
    bars: &[Bar],
    objective: Objective,
) -> Result<(f64, PerformanceMetrics), String> {
    let config = params.apply_to(base).map_err(|e| e.to_string())?;
    let result = run_backtest(&config, bars).map_err(|e| e.to_string())?;
    let score = objective.extract(&result.metrics);
    let score = if score.is_nan() { f64::NEG_INFINITY } else { score };
    Ok((score, result.metrics))
}

/// Sort best-first and assemble the result record. Errors only when every
/// candidate failed.
pub(crate) fn rank_candidates(
    mut candidates: Vec<Candidate>,
) -> Result<OptimizationResult, OptimizeError> {
    let failed = candidates.iter().filter(|c| c.failed()).count();
    if failed == candidates.len() {
        return Err(OptimizeError::AllCandidatesFailed { failed });
    }

    candidates.sort_by(|a, b| {
        b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(
        evaluations = candidates.len(),
        failed,
        best_score = candidates[0].score,
        "search ranked"
    );

    let sensitivity = parameter_sensitivity(&candidates);
    Ok(OptimizationResult {
        best: candidates[0].clone(),
        evaluations: candidates.len(),
        failed,
        sensitivity,
        ranked: candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_range_values() {
        let r = ParameterRange::int("rsi_period", 10, 20, 5);
        assert_eq!(r.values(), vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn float_range_values_are_evenly_spaced() {
        let r = ParameterRange::float("atr_stop_multiplier", 1.0, 3.0, 5);
        let v = r.values();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!((v[2] - 2.0).abs() < 1e-12);
        assert!((v[4] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_step_float_range() {
        let r = ParameterRange::float("base_risk_pct", 0.01, 0.05, 1);
        assert_eq!(r.values(), vec![0.01]);
    }

    #[test]
    fn inverted_ranges_are_empty() {
        let f = ParameterRange::float("atr_stop_multiplier", 3.0, 1.0, 5);
        assert!(f.values().is_empty());
        let i = ParameterRange::int("rsi_period", 20, 10, 1);
        assert!(i.values().is_empty());
    }

    #[test]
    fn apply_known_parameters() {
        let base = BacktestConfig::default();
        let mut values = BTreeMap::new();
        values.insert("rsi_period".to_string(), 21.0);
        values.insert("atr_stop_multiplier".to_string(), 2.5);
        let config = ParameterSet::new(values).apply_to(&base).unwrap();
        assert_eq!(config.indicators.rsi_period, 21);
        assert!((config.risk.atr_stop_multiplier - 2.5).abs() < 1e-12);
    }

    #[test]
    fn apply_rejects_unknown_parameter() {
        let base = BacktestConfig::default();
        let mut values = BTreeMap::new();
        values.insert("warp_factor".to_string(), 9.0);
        let err = ParameterSet::new(values).apply_to(&base).unwrap_err();
        assert!(matches!(err, OptimizeError::UnknownParameter { .. }));
    }

    #[test]
    fn min_confidence_sets_both_sides() {
        let base = BacktestConfig::default();
        let mut values = BTreeMap::new();
        values.insert("min_confidence".to_string(), 0.65);
        let config = ParameterSet::new(values).apply_to(&base).unwrap();
        assert!((config.signals.min_confidence_buy - 0.65).abs() < 1e-12);
        assert!((config.signals.min_confidence_sell - 0.65).abs() < 1e-12);
    }

    #[test]
    fn rank_sinks_failures() {
        let ok = Candidate {
            params: ParameterSet::new(BTreeMap::new()),
            score: 1.0,
            metrics: None,
        };
        let bad = Candidate {
            params: ParameterSet::new(BTreeMap::new()),
            score: f64::NEG_INFINITY,
            metrics: None,
        };
        let result = rank_candidates(vec![bad.clone(), ok]).unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.evaluations, 2);
        assert!((result.best.score - 1.0).abs() < 1e-12);
        assert!(result.ranked.last().is_some_and(|c| c.failed()));
    }

    #[test]
    fn rank_errors_when_all_fail() {
        let bad = Candidate {
            params: ParameterSet::new(BTreeMap::new()),
            score: f64::NEG_INFINITY,
            metrics: None,
        };
        assert!(matches!(
            rank_candidates(vec![bad.clone(), bad]),
            Err(OptimizeError::AllCandidatesFailed { failed: 2 })
        ));
    }
}
