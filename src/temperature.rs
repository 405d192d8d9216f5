//! Temperature calibration for simulated annealing.

use crate::problem::Problem;
use crate::solution::Solution;
use log::debug;
use serde::{Deserialize, Serialize};

/// Starting temperature and geometric cooling factor of an annealing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingParameters {
    pub initial_temperature: f64,
    pub cooling_factor: f64,
}

/// Derive the annealing parameters by sampling operator moves.
///
/// `apply` is run `test_runs` times on a copy of `initial`. The average
/// objective increase of the feasible worsening moves gives a starting
/// temperature at which such a move is accepted with probability
/// `initial_acceptance`. The cooling factor then takes the temperature down to
/// `final_temperature` after `cooling_steps` multiplications.
#[allow(clippy::too_many_arguments)]
pub fn calibrate<R, F>(
    problem: &Problem,
    initial: &Solution,
    test_runs: usize,
    cooling_steps: usize,
    initial_acceptance: f64,
    final_temperature: f64,
    rng: &mut R,
    mut apply: F,
) -> AnnealingParameters
where
    F: FnMut(&mut Solution, &mut R),
{
    assert!(
        initial_acceptance > 0.0 && initial_acceptance < 1.0,
        "Initial acceptance probability must be in (0, 1), got {}",
        initial_acceptance
    );
    assert!(
        final_temperature > 0.0,
        "Final temperature must be positive, got {}",
        final_temperature
    );

    let mut base = initial.clone();
    let base_value = base.objective_value(problem, true);
    let mut trial = base.clone();

    let mut sum = 0.0;
    let mut count = 0usize;
    for _ in 0..test_runs {
        base.copy_into(&mut trial);
        apply(&mut trial, rng);
        if trial.is_feasible(problem, true, true) {
            let delta = trial.objective_value(problem, false) - base_value;
            if delta > 0 {
                sum += delta as f64;
                count += 1;
            }
        }
    }

    let average_delta = if count > 0 { sum / count as f64 } else { 1.0 };
    let initial_temperature = -average_delta / initial_acceptance.ln();

    let cooling_factor = if cooling_steps == 0 || initial_temperature <= final_temperature {
        1.0
    } else {
        (final_temperature / initial_temperature).powf(1.0 / cooling_steps as f64)
    };

    debug!(
        "Sampled {} worsening moves out of {} (average delta {:.2}), initial temperature {:.4}, cooling factor {:.8}",
        count, test_runs, average_delta, initial_temperature, cooling_factor
    );

    AnnealingParameters {
        initial_temperature,
        cooling_factor,
    }
}

/// Probability of accepting a move changing the objective by `delta`.
///
/// Improvements are always accepted. At a temperature of zero anything else
/// is rejected.
pub fn acceptance_probability(delta: i64, temperature: f64) -> f64 {
    if delta < 0 {
        return 1.0;
    }
    if temperature <= 0.0 {
        return 0.0;
    }
    (-(delta as f64) / temperature).exp()
}
