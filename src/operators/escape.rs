//! Disruptive operators used to leave a local optimum.

use super::reinsert::reinsert_once;
use super::utils::move_cargo;
use crate::problem::Problem;
use crate::solution::Solution;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

/// Move between one and a tenth of all cargoes from vessels to the spot carrier.
pub fn move_to_spot_carrier<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) {
    let spot = problem.nr_of_vessels();
    let count = rng.gen_range(1..=(problem.nr_of_cargo() / 10).max(1));
    trace!("Moving {} cargoes to the spot carrier", count);

    for _ in 0..count {
        let Some(vessel) = solution.find_non_empty_vessel(true, 1, rng) else {
            return;
        };
        let segments = solution.split_into_segments(false).to_vec();
        if let Some(&cargo_id) = segments[vessel].choose(rng) {
            move_cargo(solution, problem, segments, vessel, spot, cargo_id, rng);
        }
    }
}

/// Reinsert between two and a fifth of all cargoes into other vessels.
pub fn reinsert_n<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) {
    let count = rng.gen_range(2..=(problem.nr_of_cargo() / 5).max(2));
    trace!("Reinserting {} cargoes", count);

    for _ in 0..count {
        reinsert_once(solution, problem, 1.0, rng);
    }
}
