//! Genetic parameter search.
//!
//! Classic generational GA over `ParameterSet` genomes: tournament
//! selection, uniform per-parameter crossover, resample mutation, top-k
//! elitism. Stops after `generations` rounds or once the best score has
//! not improved for `stagnation_limit` consecutive generations. All
//! randomness flows from one seeded `StdRng`, so runs reproduce exactly.

use std::collections::BTreeMap;

use rand::prelude::*;
use tracing::debug;

use stratlab_core::{BacktestConfig, Bar};

use super::{
    rank_candidates, score_candidates, Candidate, OptimizationResult, OptimizeError,
    ParameterRange, ParameterSet,
};
use crate::objective::Objective;

#[derive(Debug, Clone)]
pub struct GeneticSearch {
    pub ranges: Vec<ParameterRange>,
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub elitism: usize,
    pub stagnation_limit: usize,
    pub seed: u64,
}

impl GeneticSearch {
    pub fn new(ranges: Vec<ParameterRange>) -> Self {
        Self {
            ranges,
            population_size: 40,
            generations: 20,
            tournament_size: 3,
            mutation_rate: 0.15,
            elitism: 2,
            stagnation_limit: 5,
            seed: 42,
        }
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
        if self.ranges.is_empty() || self.ranges.iter().any(|r| r.values().is_empty()) {
            return Err(OptimizeError::NoParameters);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population: Vec<ParameterSet> =
            (0..self.population_size.max(2)).map(|_| self.random_genome(&mut rng)).collect();

        let mut all_evaluated: Vec<Candidate> = Vec::new();
        let mut best_score = f64::NEG_INFINITY;
        let mut stagnant = 0usize;

        for generation in 0..self.generations.max(1) {
            let mut scored = score_candidates(&population, base, bars, objective);
            // Determinism: rayon returns in input order, but sort by score
            // before breeding so selection pressure is explicit.
            scored.sort_by(|a, b| {
                b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
            });

            let generation_best = scored.first().map(|c| c.score).unwrap_or(f64::NEG_INFINITY);
            if generation_best > best_score {
                best_score = generation_best;
                stagnant = 0;
            } else {
                stagnant += 1;
            }
            debug!(generation, generation_best, stagnant, "generation complete");

            all_evaluated.extend(scored.iter().cloned());
            if stagnant >= self.stagnation_limit || generation + 1 == self.generations.max(1) {
                break;
            }

            population = self.next_generation(&scored, &mut rng);
        }

        rank_candidates(all_evaluated)
    }

    fn random_genome(&self, rng: &mut StdRng) -> ParameterSet {
        let mut values = BTreeMap::new();
        for range in &self.ranges {
            values.insert(range.name.clone(), range.sample(rng));
        }
        ParameterSet::new(values)
    }

    /// Elites survive unchanged; the rest are bred from tournament winners.
    fn next_generation(&self, ranked: &[Candidate], rng: &mut StdRng) -> Vec<ParameterSet> {
        let mut next: Vec<ParameterSet> = ranked
            .iter()
            .take(self.elitism.min(ranked.len()))
            .map(|c| c.params.clone())
            .collect();

        while next.len() < self.population_size.max(2) {
            let a = self.tournament(ranked, rng);
            let b = self.tournament(ranked, rng);
            let mut child = self.crossover(a, b, rng);
            self.mutate(&mut child, rng);
            next.push(child);
        }
        next
    }

    /// Best of `tournament_size` uniformly drawn candidates.
    fn tournament<'a>(&self, ranked: &'a [Candidate], rng: &mut StdRng) -> &'a ParameterSet {
        let mut best: Option<&Candidate> = None;
        for _ in 0..self.tournament_size.max(1) {
            let pick = &ranked[rng.gen_range(0..ranked.len())];
            if best.map_or(true, |b| pick.score > b.score) {
                best = Some(pick);
            }
        }
        // ranked is non-empty: the loop always picks at least once.
        best.map(|c| &c.params).unwrap_or(&ranked[0].params)
    }

    /// Uniform crossover: each gene comes from either parent with equal
    /// probability.
    fn crossover(&self, a: &ParameterSet, b: &ParameterSet, rng: &mut StdRng) -> ParameterSet {
        let mut values = BTreeMap::new();
        for range in &self.ranges {
            let from_a = rng.gen_bool(0.5);
            let parent = if from_a { a } else { b };
            let value = parent
                .get(&range.name)
                .unwrap_or_else(|| range.values().first().copied().unwrap_or(0.0));
            values.insert(range.name.clone(), value);
        }
        ParameterSet::new(values)
    }

    /// Resample each gene with probability `mutation_rate`.
    fn mutate(&self, genome: &mut ParameterSet, rng: &mut StdRng) {
        for range in &self.ranges {
            if rng.gen_bool(self.mutation_rate.clamp(0.0, 1.0)) {
                genome.values.insert(range.name.clone(), range.sample(rng));
            }
        }
    }
}
