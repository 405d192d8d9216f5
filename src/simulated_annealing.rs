//! Simulated annealing with a fixed operator probability table.

use crate::algorithm::Algorithm;
use crate::config::Config;
use crate::operators::Operator;
use crate::problem::Problem;
use crate::solution::Solution;
use crate::temperature::{acceptance_probability, calibrate};
use log::{info, trace};
use rand::Rng;

/// Plain simulated annealing.
///
/// Each iteration rolls a number in `[0, 1)` and walks the cumulative
/// probabilities of `table`. When the roll exceeds all of them the
/// `fallback` operator is used.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealing {
    pub config: Config,
    pub table: Vec<(f64, Operator)>,
    pub fallback: Operator,
}

impl SimulatedAnnealing {
    /// Create the search from a probability table.
    ///
    /// # Panics
    ///
    /// Panics if a probability is negative or they sum to more than one.
    pub fn new(config: Config, table: Vec<(f64, Operator)>, fallback: Operator) -> Self {
        let total: f64 = table.iter().map(|&(probability, _)| probability).sum();
        assert!(
            table.iter().all(|&(probability, _)| probability >= 0.0) && total <= 1.0,
            "Operator probabilities must be positive and sum to at most one, got {:?}",
            table
        );
        SimulatedAnnealing {
            config,
            table,
            fallback,
        }
    }

    /// Exchange operators with a reinsert fallback.
    pub fn classic(config: Config) -> Self {
        Self::new(
            config,
            vec![(0.001, Operator::TwoExchange), (0.05, Operator::ThreeExchange)],
            Operator::ReinsertOnce { vessel_bias: 0.75 },
        )
    }

    /// Operators guided by the cargo data with a reinsert fallback.
    pub fn cargo_aware(config: Config) -> Self {
        Self::new(
            config,
            vec![
                (0.5, Operator::MinimizeWaitTime),
                (0.2, Operator::MinimizeNotTransported),
            ],
            Operator::ReinsertOnce { vessel_bias: 1.0 },
        )
    }

    /// Operator whose cumulative probability interval holds `roll`.
    pub fn pick_operator(&self, roll: f64) -> Operator {
        let mut acc = 0.0;
        for &(probability, operator) in &self.table {
            acc += probability;
            if roll < acc {
                return operator;
            }
        }
        self.fallback
    }
}

impl Algorithm for SimulatedAnnealing {
    fn search<R: Rng>(
        &mut self,
        problem: &Problem,
        initial: &Solution,
        iterations: usize,
        rng: &mut R,
    ) -> Solution {
        let parameters = calibrate(
            problem,
            initial,
            self.config.calibration_runs,
            iterations,
            self.config.initial_acceptance,
            self.config.final_temperature,
            rng,
            |trial, rng| self.pick_operator(rng.gen()).operate(trial, problem, rng),
        );
        let mut temperature = parameters.initial_temperature;

        let mut best = initial.clone();
        let mut best_value = best.objective_value(problem, true);
        let mut current = initial.clone();
        let mut current_value = best_value;
        let mut candidate = initial.clone();

        for _ in 0..iterations {
            let operator = self.pick_operator(rng.gen());
            current.copy_into(&mut candidate);
            operator.operate(&mut candidate, problem, rng);

            if candidate.is_feasible(problem, false, false) {
                let candidate_value = candidate.objective_value(problem, false);
                let delta = candidate_value - current_value;

                if delta < 0 {
                    candidate.copy_into(&mut current);
                    current_value = candidate_value;
                    if current_value < best_value {
                        trace!("New best objective value {} by {}", current_value, operator);
                        current.copy_into(&mut best);
                        best_value = current_value;
                    }
                } else if rng.gen::<f64>() < acceptance_probability(delta, temperature) {
                    candidate.copy_into(&mut current);
                    current_value = candidate_value;
                }
            }
            temperature *= parameters.cooling_factor;
        }

        assert!(
            best.is_feasible(problem, true, true),
            "Best solution found is not feasible: {}",
            best
        );
        info!(
            "Simulated annealing finished with objective value {} at temperature {:.4}",
            best_value, temperature
        );
        best
    }

    fn name(&self) -> &'static str {
        "simulated_annealing"
    }
}
