//! Simulated annealing with adaptive operator weights.
//!
//! The search is split into segments. During a segment every operator
//! collects a score for the candidates it produces and at the end of the
//! segment the scores are turned into new selection probabilities. Recently
//! accepted solutions are kept in a [`TabuMemory`] and only count as
//! improvements when they are not taboo. When no improvement has been found
//! for a while an [`EscapeOperator`] is applied to the current solution.

use crate::algorithm::Algorithm;
use crate::config::{fraction_of, Config};
use crate::operators::{EscapeOperator, Operator};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::tabu::TabuMemory;
use crate::temperature::{acceptance_probability, calibrate};
use crate::weights::{step_score, OperatorWeights};
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Counters collected during an adaptive annealing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnealingStatistics {
    pub improvements: usize,
    pub global_bests: usize,
    pub accepted_worse: usize,
    pub rejected: usize,
    pub infeasible: usize,
    pub taboo_hits: usize,
    pub escapes: usize,
    /// Iterations without improvement at the moment each escape was applied
    pub escape_streaks: Vec<usize>,
    pub tabu_reductions: usize,
    pub segments: usize,
    pub initial_temperature: f64,
    pub final_temperature: f64,
    /// Operator selection probabilities after the last segment
    pub final_weights: Vec<f64>,
}

/// Simulated annealing with adaptive operator weights, tabu memory and escapes.
#[derive(Debug, Clone)]
pub struct AdaptiveAnnealing {
    pub config: Config,
    pub operators: Vec<Operator>,
    pub escape_operators: Vec<EscapeOperator>,
    pub statistics: AnnealingStatistics,
}

impl AdaptiveAnnealing {
    /// Create the search with the default operator pools.
    pub fn new(config: Config) -> Self {
        Self::with_operators(config, Operator::default_pool(), EscapeOperator::ALL.to_vec())
    }

    /// Create the search with custom operator pools.
    ///
    /// # Panics
    ///
    /// Panics if either pool is empty.
    pub fn with_operators(
        config: Config,
        operators: Vec<Operator>,
        escape_operators: Vec<EscapeOperator>,
    ) -> Self {
        assert!(!operators.is_empty(), "At least one operator is required");
        assert!(
            !escape_operators.is_empty(),
            "At least one escape operator is required"
        );
        AdaptiveAnnealing {
            config,
            operators,
            escape_operators,
            statistics: AnnealingStatistics::default(),
        }
    }
}

impl Algorithm for AdaptiveAnnealing {
    fn search<R: Rng>(
        &mut self,
        problem: &Problem,
        initial: &Solution,
        iterations: usize,
        rng: &mut R,
    ) -> Solution {
        let segment_length = fraction_of(iterations, self.config.segment_fraction);
        // One-iteration segments would leave no search steps at all.
        let segmented = segment_length >= 2;
        let search_steps = if segmented {
            iterations - iterations / segment_length
        } else {
            iterations
        };
        let escape_threshold = fraction_of(iterations, self.config.escape_fraction);
        let tabu_reduction_threshold =
            fraction_of(iterations, self.config.tabu_reduction_fraction);
        let mut tabu = TabuMemory::new(
            iterations,
            self.config.min_tabu_fraction,
            self.config.max_tabu_fraction,
        );

        if segmented {
            debug!("Each segment lasts {} iterations", segment_length);
        } else {
            debug!("Too few iterations for segments, weights stay fixed");
        }
        debug!(
            "Tabu memory shrinks after {} iterations without improvement",
            tabu_reduction_threshold
        );
        debug!(
            "Escaping every {} iterations without improvement",
            escape_threshold
        );

        let mut statistics = AnnealingStatistics::default();
        let mut weights = OperatorWeights::new(
            self.operators
                .iter()
                .map(Operator::characteristic)
                .collect(),
        );
        debug!("Initial operator weights {:?}", weights.weights());

        let operators = &self.operators;
        let parameters = calibrate(
            problem,
            initial,
            self.config.calibration_runs,
            search_steps,
            self.config.initial_acceptance,
            self.config.final_temperature,
            rng,
            |trial, rng| operators[weights.select(rng)].operate(trial, problem, rng),
        );
        let mut temperature = parameters.initial_temperature;
        statistics.initial_temperature = temperature;

        let mut best = initial.clone();
        let mut best_value = best.objective_value(problem, true);
        let mut current = initial.clone();
        let mut current_value = best_value;
        let mut candidate = initial.clone();

        let mut non_improvement = 0usize;

        for iteration in 1..=iterations {
            if segmented && iteration % segment_length == 0 {
                let progress = iteration as f64 / iterations as f64;
                trace!("End of segment at iteration {}", iteration);
                weights.recalculate(progress);
                statistics.segments += 1;
                continue;
            }

            if non_improvement >= tabu_reduction_threshold {
                tabu.reduce_size();
                statistics.tabu_reductions += 1;
            }

            if non_improvement > 0 && non_improvement % escape_threshold == 0 {
                if let Some(escape) = self.escape_operators.choose(rng) {
                    trace!(
                        "No improvement for {} iterations, escaping with {}",
                        non_improvement,
                        escape.name()
                    );
                    escape.operate(&mut current, problem, rng);
                    current_value = current.objective_value(problem, false);
                    statistics.escapes += 1;
                    statistics.escape_streaks.push(non_improvement);
                }
            }

            let selected = weights.select(rng);
            let operator = self.operators[selected];
            current.copy_into(&mut candidate);
            operator.operate(&mut candidate, problem, rng);

            let candidate_value = candidate.objective_value(problem, false);
            let taboo = tabu.check_taboo(&candidate);
            let delta = candidate_value - current_value;

            if taboo {
                statistics.taboo_hits += 1;
            }

            let feasible = candidate.is_feasible(problem, false, false);
            let mut global_best = false;
            if feasible {
                if delta < 0 && !taboo {
                    non_improvement = 0;
                    tabu.reset_size();
                    candidate.copy_into(&mut current);
                    current_value = candidate_value;
                    tabu.push(&candidate);
                    statistics.improvements += 1;

                    if candidate_value < best_value {
                        global_best = true;
                        trace!(
                            "New best solution with objective value {} found by {} (delta {})",
                            candidate_value,
                            operator,
                            candidate_value - best_value
                        );
                        candidate.copy_into(&mut best);
                        best_value = candidate_value;
                        statistics.global_bests += 1;
                    }
                } else {
                    if rng.gen::<f64>() < acceptance_probability(delta, temperature) {
                        candidate.copy_into(&mut current);
                        current_value = candidate_value;
                        tabu.push(&candidate);
                        statistics.accepted_worse += 1;
                    } else {
                        statistics.rejected += 1;
                    }
                    non_improvement += 1;
                }
            } else {
                statistics.infeasible += 1;
            }

            weights.record(selected, step_score(delta < 0, taboo, feasible, global_best));
            temperature *= parameters.cooling_factor;
        }

        assert!(
            best.is_feasible(problem, true, true),
            "Best solution found is not feasible: {}",
            best
        );

        statistics.final_temperature = temperature;
        statistics.final_weights = weights.weights().to_vec();
        info!(
            "Adaptive annealing finished with objective value {} ({} improvements, {} escapes)",
            best_value, statistics.improvements, statistics.escapes
        );
        self.statistics = statistics;
        best
    }

    fn name(&self) -> &'static str {
        "adaptive_annealing"
    }
}
