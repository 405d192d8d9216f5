//! Operators guided by the cargo data: spot carrier usage, port waiting and
//! shared ports.

use super::utils::{compatible_vessels, move_cargo, MAX_TRIES};
use crate::problem::Problem;
use crate::solution::Solution;
use itertools::Itertools;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

/// Take a random cargo from the spot carrier and insert it into a vessel able to carry it.
pub fn minimize_not_transported<R: Rng>(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut R,
) -> bool {
    let spot = problem.nr_of_vessels();
    let segments = solution.split_into_segments(true).to_vec();

    let Some(&cargo_id) = segments[spot].choose(rng) else {
        return false;
    };
    let Some(&dest) = compatible_vessels(problem, cargo_id, spot).choose(rng) else {
        trace!("No vessel can carry cargo {}", cargo_id);
        return false;
    };

    move_cargo(solution, problem, segments, spot, dest, cargo_id, rng)
}

/// Reduce the time the most idle vessel spends waiting at ports.
///
/// The stop with the longest wait of that vessel is moved to other positions
/// within the vessel. If no feasible arrangement with less total waiting is
/// found the cargo is moved to another vessel instead.
pub fn minimize_wait_time<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) -> bool {
    let mut segments = solution.split_into_segments(true).to_vec();

    let Some(metadata) = (0..problem.nr_of_vessels())
        .map(|vessel| Solution::evaluate_segment(problem, vessel, &segments[vessel]))
        .filter(|metadata| metadata.feasible && metadata.total_wait() > 0)
        .max_by_key(|metadata| metadata.total_wait())
    else {
        return false;
    };
    let Some(stop) = metadata.longest_wait() else {
        return false;
    };

    let vessel = metadata.vessel_index;
    let waited = metadata.total_wait();
    let cargo_id = segments[vessel][stop];
    trace!(
        "Vessel {} waits {} in total, longest at cargo {}",
        vessel,
        waited,
        cargo_id
    );

    let mut sub = segments[vessel].clone();
    for _ in 0..MAX_TRIES {
        sub.copy_from_slice(&segments[vessel]);
        let element = sub.remove(stop);
        sub.insert(rng.gen_range(0..=sub.len()), element);

        let candidate = Solution::evaluate_segment(problem, vessel, &sub);
        if candidate.feasible && candidate.total_wait() < waited {
            segments[vessel] = sub;
            solution.join_from_segments(segments);
            return true;
        }
    }

    let Some(&dest) = compatible_vessels(problem, cargo_id, vessel).choose(rng) else {
        return false;
    };
    move_cargo(solution, problem, segments, vessel, dest, cargo_id, rng)
}

/// Gather cargoes sharing a port into the same vessel.
///
/// A random cargo of a random vessel is picked. Among the cargoes in other
/// segments that share its origin or destination port and that the vessel can
/// carry, one is moved into the vessel.
pub fn move_similar_cargo<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) -> bool {
    let Some(vessel) = solution.find_non_empty_vessel(true, 1, rng) else {
        return false;
    };
    let segments = solution.split_into_segments(false).to_vec();

    let Some(&anchor) = segments[vessel].choose(rng) else {
        return false;
    };
    let anchor_cargo = problem.cargo(anchor);

    let similar = segments
        .iter()
        .enumerate()
        .filter(|&(other, _)| other != vessel)
        .flat_map(|(other, segment)| segment.iter().unique().map(move |&id| (other, id)))
        .filter(|&(_, id)| {
            let cargo = problem.cargo(id);
            problem.can_carry(vessel, id)
                && (cargo.origin_port == anchor_cargo.origin_port
                    || cargo.dest_port == anchor_cargo.dest_port)
        })
        .collect::<Vec<_>>();

    let Some(&(org, cargo_id)) = similar.choose(rng) else {
        trace!("No cargo similar to {} outside vessel {}", anchor, vessel);
        return false;
    };

    move_cargo(solution, problem, segments, org, vessel, cargo_id, rng)
}
