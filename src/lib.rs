//! # PDP-Anneal
//!
//! A heuristic solver for a pickup and delivery problem with time windows
//! and a heterogeneous fleet of vessels.
//!
//! Every cargo must be picked up at its origin port and delivered at its
//! destination port by a compatible vessel within the cargo's time windows,
//! or be left to a spot carrier at a penalty. Solutions are flat sequences of
//! cargo ids split into vessel routes by barrier elements, see [`Solution`].
//!
//! The main search is a simulated annealing that learns which neighborhood
//! operators work well, keeps a tabu memory of recently accepted solutions,
//! and applies disruptive escape operators when it stagnates.

pub mod algorithm;
pub mod annealing;
pub mod config;
pub mod local_search;
pub mod operators;
pub mod problem;
pub mod simulated_annealing;
pub mod solution;
pub mod tabu;
pub mod temperature;
pub mod utils;
pub mod weights;

use crate::algorithm::Algorithm;
use crate::annealing::{AdaptiveAnnealing, AnnealingStatistics};
use crate::config::{AlgorithmKind, Config};
use crate::local_search::LocalSearch;
use crate::problem::Problem;
use crate::simulated_annealing::SimulatedAnnealing;
use crate::solution::Solution;
use crate::utils::SearchReport;

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Runs the configured search algorithm on a problem.
pub struct Solver {
    pub problem: Problem,
    pub config: Config,
    pub best_solution: Option<Solution>,
    pub initial_objective: i64,
    pub best_objective: i64,
    pub run_time: Duration,
    /// Seed used by the last run
    pub seed: u64,
    /// Counters of the last adaptive annealing run
    pub statistics: Option<AnnealingStatistics>,
}

impl Solver {
    /// Create a new solver for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        Solver {
            problem,
            config,
            best_solution: None,
            initial_objective: 0,
            best_objective: 0,
            run_time: Duration::from_secs(0),
            seed: 0,
            statistics: None,
        }
    }

    /// Run the configured algorithm from the solution leaving every cargo to
    /// the spot carrier.
    pub fn run(&mut self) -> &Solution {
        let initial = Solution::standard(&self.problem);
        self.run_from(&initial)
    }

    /// Run the configured algorithm from a feasible solution.
    ///
    /// # Panics
    ///
    /// Panics if `initial` is not feasible.
    pub fn run_from(&mut self, initial: &Solution) -> &Solution {
        let start_time = Instant::now();

        self.seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut initial = initial.clone();
        assert!(
            initial.is_feasible(&self.problem, true, true),
            "Initial solution is not feasible: {}",
            initial
        );
        self.initial_objective = initial.objective_value(&self.problem, false);

        info!(
            "Running {:?} on {} for {} iterations with seed {}",
            self.config.algorithm, self.problem.name, self.config.iterations, self.seed
        );

        let iterations = self.config.iterations;
        let mut best = match self.config.algorithm {
            AlgorithmKind::Adaptive => {
                let mut search = AdaptiveAnnealing::new(self.config.clone());
                let best = search.search(&self.problem, &initial, iterations, &mut rng);
                self.statistics = Some(search.statistics);
                best
            }
            AlgorithmKind::Annealing => SimulatedAnnealing::cargo_aware(self.config.clone())
                .search(&self.problem, &initial, iterations, &mut rng),
            AlgorithmKind::LocalSearch => {
                LocalSearch::default().search(&self.problem, &initial, iterations, &mut rng)
            }
        };

        assert!(
            best.is_feasible(&self.problem, true, true),
            "Search returned an infeasible solution: {}",
            best
        );
        self.best_objective = best.objective_value(&self.problem, false);
        self.run_time = start_time.elapsed();

        info!(
            "Objective value went from {} to {} in {:?}",
            self.initial_objective, self.best_objective, self.run_time
        );
        &*self.best_solution.insert(best)
    }

    /// Summarize the last run.
    ///
    /// Returns `None` before the first run.
    pub fn report(&self) -> Option<SearchReport> {
        let best = self.best_solution.as_ref()?;
        Some(SearchReport::new(
            &self.problem,
            &self.config,
            self.seed,
            best,
            self.initial_objective,
            self.best_objective,
            self.run_time,
        ))
    }
}
