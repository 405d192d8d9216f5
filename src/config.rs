//! Configuration parameters for the search algorithms.

use serde::{Deserialize, Serialize};

/// Search algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Simulated annealing with adaptive operator weights, tabu memory and escapes
    Adaptive,
    /// Plain simulated annealing with fixed operator probabilities
    Annealing,
    /// Keep feasible improvements only
    LocalSearch,
}

/// Configuration settings for a search run.
///
/// Every fraction is relative to the total number of iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub algorithm: AlgorithmKind,
    /// Total number of iterations
    pub iterations: usize,
    /// Seed of the random number generator, drawn at random when absent
    pub seed: Option<u64>,
    /// Probability of accepting an average worsening move at the start
    pub initial_acceptance: f64,
    /// Temperature reached after the last iteration
    pub final_temperature: f64,
    /// Trial operator applications used to calibrate the temperature
    pub calibration_runs: usize,
    /// Length of a weight update segment
    pub segment_fraction: f64,
    /// Iterations without improvement before the tabu memory shrinks
    pub tabu_reduction_fraction: f64,
    /// Iterations without improvement between escapes
    pub escape_fraction: f64,
    /// Lower bound of the tabu memory size
    pub min_tabu_fraction: f64,
    /// Upper bound of the tabu memory size
    pub max_tabu_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            algorithm: AlgorithmKind::Adaptive,
            iterations: 10_000,
            seed: None,
            initial_acceptance: 0.8,
            final_temperature: 0.1,
            calibration_runs: 100,
            segment_fraction: 0.01,
            tabu_reduction_fraction: 0.005,
            escape_fraction: 0.02,
            min_tabu_fraction: 0.001,
            max_tabu_fraction: 0.01,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the algorithm.
    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initial acceptance probability.
    pub fn with_initial_acceptance(mut self, probability: f64) -> Self {
        self.initial_acceptance = probability;
        self
    }

    /// Set the final temperature.
    pub fn with_final_temperature(mut self, temperature: f64) -> Self {
        self.final_temperature = temperature;
        self
    }

    /// Set the number of calibration runs.
    pub fn with_calibration_runs(mut self, runs: usize) -> Self {
        self.calibration_runs = runs;
        self
    }

    /// Set the segment length as a fraction of the iterations.
    pub fn with_segment_fraction(mut self, fraction: f64) -> Self {
        self.segment_fraction = fraction;
        self
    }

    /// Set the escape interval as a fraction of the iterations.
    pub fn with_escape_fraction(mut self, fraction: f64) -> Self {
        self.escape_fraction = fraction;
        self
    }

    /// Set the tabu size bounds as fractions of the iterations.
    pub fn with_tabu_fractions(mut self, min_fraction: f64, max_fraction: f64) -> Self {
        self.min_tabu_fraction = min_fraction;
        self.max_tabu_fraction = max_fraction;
        self
    }
}

/// Number of iterations matching a fraction of `total`, at least one.
pub fn fraction_of(total: usize, fraction: f64) -> usize {
    ((total as f64 * fraction) as usize).max(1)
}
