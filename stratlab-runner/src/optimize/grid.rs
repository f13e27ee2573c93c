//! Exhaustive grid search with seeded subsampling.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand::seq::index::sample;
use tracing::debug;

use stratlab_core::{BacktestConfig, Bar};

use super::{
    rank_candidates, score_candidates, OptimizationResult, OptimizeError, ParameterRange,
    ParameterSet,
};
use crate::objective::Objective;

/// Cartesian product over discretized ranges. When the product exceeds
/// `max_combinations`, a uniform subsample of that size is evaluated
/// instead, drawn from the given seed so reruns see the same grid.
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub ranges: Vec<ParameterRange>,
    pub max_combinations: usize,
    pub seed: u64,
}

impl GridSearch {
    pub fn new(ranges: Vec<ParameterRange>) -> Self {
        Self { ranges, max_combinations: 1_000, seed: 42 }
    }

    pub fn with_max_combinations(mut self, max: usize) -> Self {
        self.max_combinations = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn run(
        &self,
        base: &BacktestConfig,
        bars: &[Bar],
        objective: Objective,
    ) -> Result<OptimizationResult, OptimizeError> {
        base.validate()?;
        let sets = self.candidate_sets()?;
        let candidates = score_candidates(&sets, base, bars, objective);
        rank_candidates(candidates)
    }

    /// All grid points, or a seeded uniform subsample of them.
    pub(crate) fn candidate_sets(&self) -> Result<Vec<ParameterSet>, OptimizeError> {
        if self.ranges.is_empty() {
            return Err(OptimizeError::NoParameters);
        }
        let axes: Vec<(String, Vec<f64>)> =
            self.ranges.iter().map(|r| (r.name.clone(), r.values())).collect();
        if axes.iter().any(|(_, v)| v.is_empty()) {
            return Err(OptimizeError::NoParameters);
        }

        let total: usize = axes.iter().map(|(_, v)| v.len()).product();
        let mut sets = Vec::with_capacity(total.min(self.max_combinations));

        if total <= self.max_combinations {
            for flat in 0..total {
                sets.push(nth_combination(&axes, flat));
            }
        } else {
            debug!(total, cap = self.max_combinations, "subsampling grid");
            let mut rng = StdRng::seed_from_u64(self.seed);
            let mut picks = sample(&mut rng, total, self.max_combinations).into_vec();
            picks.sort_unstable();
            for flat in picks {
                sets.push(nth_combination(&axes, flat));
            }
        }
        Ok(sets)
    }
}

/// Decode a flat index into one point of the Cartesian product.
fn nth_combination(axes: &[(String, Vec<f64>)], mut flat: usize) -> ParameterSet {
    let mut values = BTreeMap::new();
    for (name, axis) in axes.iter().rev() {
        values.insert(name.clone(), axis[flat % axis.len()]);
        flat /= axis.len();
    }
    ParameterSet::new(values)
}
