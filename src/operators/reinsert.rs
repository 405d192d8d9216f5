//! Move a single cargo from one segment to another.

use super::utils::{compatible_vessels, move_cargo};
use crate::problem::Problem;
use crate::solution::Solution;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick a segment holding cargo and move one of its cargoes elsewhere.
///
/// When the cargo comes from a vessel it goes to another vessel with
/// probability `vessel_bias` and to the spot carrier otherwise. Cargo taken
/// from the spot carrier always goes to a vessel able to carry it.
pub fn reinsert_once<R: Rng>(
    solution: &mut Solution,
    problem: &Problem,
    vessel_bias: f64,
    rng: &mut R,
) -> bool {
    let spot = problem.nr_of_vessels();
    let segments = solution.split_into_segments(true).to_vec();

    let non_empty = (0..segments.len())
        .filter(|&i| !segments[i].is_empty())
        .collect::<Vec<_>>();
    let Some(&org) = non_empty.choose(rng) else {
        return false;
    };
    let Some(&cargo_id) = segments[org].choose(rng) else {
        return false;
    };

    let to_vessel = org == spot || rng.gen_bool(vessel_bias.clamp(0.0, 1.0));
    let dest = if to_vessel {
        match compatible_vessels(problem, cargo_id, org).choose(rng) {
            Some(&vessel) => vessel,
            None if org != spot => spot,
            None => return false,
        }
    } else {
        spot
    };

    trace!("Reinserting cargo {} from {} to {}", cargo_id, org, dest);
    move_cargo(solution, problem, segments, org, dest, cargo_id, rng)
}
