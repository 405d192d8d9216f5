//! Utility functions and structures for reporting search results.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{AlgorithmKind, Config};
use crate::problem::Problem;
use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a solution to a file, listing the route of every vessel.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    let mut solution = solution.clone();

    writeln!(file, "Solution for instance: {}", problem.name)?;
    writeln!(
        file,
        "Objective Value: {}",
        solution.objective_value(problem, true)
    )?;
    writeln!(
        file,
        "Is Feasible: {}",
        solution.is_feasible(problem, false, true)
    )?;
    writeln!(file, "Sequence: {}", solution)?;
    writeln!(file)?;

    let segments = solution.split_into_segments(false);
    for (vessel, segment) in segments.iter().enumerate() {
        if vessel == problem.nr_of_vessels() {
            write!(file, "Spot carrier: ")?;
        } else {
            write!(file, "Vessel #{}: ", vessel + 1)?;
        }

        if segment.is_empty() {
            writeln!(file, "Empty")?;
            continue;
        }

        let stops = segment
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        writeln!(file, "{}", stops)?;
        writeln!(
            file,
            "  Cost: {}",
            Solution::segment_cost(problem, vessel, segment)
        )?;
    }

    Ok(())
}

/// Summary of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub algorithm: AlgorithmKind,
    pub instance: String,
    pub seed: u64,
    pub iterations: usize,
    pub objective: i64,
    pub initial_objective: i64,
    /// Reduction of the objective value in percent of the initial value
    pub improvement: f64,
    pub feasible: bool,
    pub sequence: Vec<usize>,
    pub runtime_ms: u128,
}

impl SearchReport {
    pub fn new(
        problem: &Problem,
        config: &Config,
        seed: u64,
        solution: &Solution,
        initial_objective: i64,
        objective: i64,
        runtime: Duration,
    ) -> Self {
        let mut solution = solution.clone();
        let improvement = if initial_objective == 0 {
            0.0
        } else {
            100.0 * (initial_objective - objective) as f64 / initial_objective as f64
        };

        SearchReport {
            algorithm: config.algorithm,
            instance: problem.name.clone(),
            seed,
            iterations: config.iterations,
            objective,
            initial_objective,
            improvement,
            feasible: solution.is_feasible(problem, true, true),
            sequence: solution.arr().to_vec(),
            runtime_ms: runtime.as_millis(),
        }
    }

    /// Format the report as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Report:
- Instance: {}
- Algorithm: {:?}
- Seed: {}
- Iterations: {}
- Initial Objective: {}
- Best Objective: {}
- Improvement: {:.2}%
- Feasible: {}
- Runtime: {}",
            self.instance,
            self.algorithm,
            self.seed,
            self.iterations,
            self.initial_objective,
            self.objective,
            self.improvement,
            self.feasible,
            format_duration(Duration::from_millis(self.runtime_ms as u64))
        )
    }
}
