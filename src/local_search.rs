//! Local search keeping only feasible improvements.

use crate::algorithm::Algorithm;
use crate::operators::Operator;
use crate::problem::Problem;
use crate::solution::Solution;
use log::{debug, trace};
use rand::Rng;

/// Repeatedly apply an operator to the best solution and keep the result
/// when it is feasible and better.
///
/// The operator is picked by fixed probabilities: `two_exchange` first,
/// `three_exchange` second and a reinsert for the remaining probability.
#[derive(Debug, Clone)]
pub struct LocalSearch {
    pub two_exchange_probability: f64,
    pub three_exchange_probability: f64,
    /// Used for whatever probability is left
    pub fallback: Operator,
}

impl Default for LocalSearch {
    fn default() -> Self {
        LocalSearch {
            two_exchange_probability: 0.4,
            three_exchange_probability: 0.5,
            fallback: Operator::ReinsertOnce { vessel_bias: 0.75 },
        }
    }
}

impl LocalSearch {
    /// Create a local search with custom probabilities.
    ///
    /// # Panics
    ///
    /// Panics if the probabilities are negative or sum to one or more.
    pub fn new(two_exchange_probability: f64, three_exchange_probability: f64) -> Self {
        assert!(
            two_exchange_probability >= 0.0
                && three_exchange_probability >= 0.0
                && two_exchange_probability + three_exchange_probability < 1.0,
            "Invalid probabilities. They must be positive and sum to less than one | p1={}, p2={}",
            two_exchange_probability,
            three_exchange_probability
        );
        LocalSearch {
            two_exchange_probability,
            three_exchange_probability,
            ..Default::default()
        }
    }

    fn pick_operator(&self, roll: f64) -> Operator {
        if roll < self.two_exchange_probability {
            Operator::TwoExchange
        } else if roll < self.two_exchange_probability + self.three_exchange_probability {
            Operator::ThreeExchange
        } else {
            self.fallback
        }
    }
}

impl Algorithm for LocalSearch {
    fn search<R: Rng>(
        &mut self,
        problem: &Problem,
        initial: &Solution,
        iterations: usize,
        rng: &mut R,
    ) -> Solution {
        let mut best = initial.clone();
        let mut best_value = best.objective_value(problem, true);
        let mut current = initial.clone();

        for _ in 0..iterations {
            let operator = self.pick_operator(rng.gen());
            trace!("Using operator {}", operator);

            best.copy_into(&mut current);
            operator.operate(&mut current, problem, rng);

            if current.is_feasible(problem, false, false) {
                let current_value = current.objective_value(problem, false);
                if current_value < best_value {
                    debug!(
                        "New best solution {} with objective value {} (delta {})",
                        current,
                        current_value,
                        current_value - best_value
                    );
                    current.copy_into(&mut best);
                    best_value = current_value;
                }
            }
        }
        best
    }

    fn name(&self) -> &'static str {
        "local_search"
    }
}
