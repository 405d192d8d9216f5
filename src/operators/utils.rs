//! Helpers shared by the neighborhood operators.

use crate::problem::Problem;
use crate::solution::Solution;
use log::trace;
use rand::Rng;

/// Number of perturbations tried before a segment is given up on.
pub const MAX_TRIES: usize = 10;

/// Swap two random positions of a segment.
pub fn randomize_exchange<R: Rng>(sub: &mut [usize], rng: &mut R) {
    if sub.len() < 2 {
        return;
    }
    let a = rng.gen_range(0..sub.len());
    let mut b = rng.gen_range(0..sub.len() - 1);
    if b >= a {
        b += 1;
    }
    sub.swap(a, b);
}

/// Perturb a vessel segment until it is feasible.
///
/// `init` is the segment to start from. When a feasible arrangement is found
/// it is written back into `init` and `true` is returned. After
/// [`MAX_TRIES`] failed attempts `init` is left untouched and `false` is
/// returned. Every attempt starts over from `init`, so only direct neighbors
/// are reached. Unless `allow_equal` is set the arrangement must differ from
/// `init`.
pub fn operate_vessel_til_feasible<R, F>(
    problem: &Problem,
    vessel_index: usize,
    init: &mut [usize],
    allow_equal: bool,
    rng: &mut R,
    mut operation: F,
) -> bool
where
    R: Rng,
    F: FnMut(&mut [usize], &mut R),
{
    if init.is_empty() || vessel_index == problem.nr_of_vessels() {
        return true;
    }
    // a single cargo cannot be rearranged
    if init.len() == 2 {
        return Solution::is_vessel_feasible(problem, vessel_index, init);
    }
    if allow_equal && Solution::is_vessel_feasible(problem, vessel_index, init) {
        return true;
    }

    let mut sub = init.to_vec();
    for _ in 0..MAX_TRIES {
        operation(&mut sub, rng);

        if (allow_equal || sub[..] != init[..])
            && Solution::is_vessel_feasible(problem, vessel_index, &sub)
        {
            init.copy_from_slice(&sub);
            return true;
        }
        sub.copy_from_slice(init);
    }
    false
}

/// [`operate_vessel_til_feasible`] with a single random exchange as perturbation.
pub fn exchange_once_til_feasible<R: Rng>(
    problem: &Problem,
    vessel_index: usize,
    init: &mut [usize],
    allow_equal: bool,
    rng: &mut R,
) -> bool {
    operate_vessel_til_feasible(problem, vessel_index, init, allow_equal, rng, |sub, rng| {
        randomize_exchange(sub, rng)
    })
}

/// Build the destination segment with `cargo_id` inserted.
///
/// Into a non-empty vessel the pickup and delivery are placed at random
/// positions and the segment is rearranged until feasible. Returns `None` if
/// the vessel cannot carry the cargo or no feasible arrangement was found.
pub fn add_cargo<R: Rng>(
    problem: &Problem,
    segments: &[Vec<usize>],
    dest: usize,
    cargo_id: usize,
    rng: &mut R,
) -> Option<Vec<usize>> {
    let spot = problem.nr_of_vessels();
    if dest != spot && !problem.can_carry(dest, cargo_id) {
        trace!("Vessel {} cannot carry cargo {}", dest, cargo_id);
        return None;
    }

    let mut dest_new = Vec::with_capacity(segments[dest].len() + 2);
    dest_new.extend_from_slice(&segments[dest]);

    if !dest_new.is_empty() && dest != spot {
        let old_size = dest_new.len();
        dest_new.insert(rng.gen_range(0..=old_size), cargo_id);
        // account for the element just inserted
        dest_new.insert(rng.gen_range(0..=old_size + 1), cargo_id);
    } else {
        dest_new.push(cargo_id);
        dest_new.push(cargo_id);
    }

    if !exchange_once_til_feasible(problem, dest, &mut dest_new, true, rng) {
        trace!(
            "Failed to add cargo {} to vessel {} as no feasible arrangement could be found",
            cargo_id,
            dest
        );
        return None;
    }
    Some(dest_new)
}

/// Build the origin segment with `cargo_id` removed.
///
/// Returns `None` if the remaining segment is infeasible and cannot be made
/// feasible by rearranging it.
pub fn remove_cargo<R: Rng>(
    problem: &Problem,
    segments: &[Vec<usize>],
    org: usize,
    cargo_id: usize,
    rng: &mut R,
) -> Option<Vec<usize>> {
    let mut org_new = segments[org]
        .iter()
        .copied()
        .filter(|&id| id != cargo_id)
        .collect::<Vec<_>>();

    if !exchange_once_til_feasible(problem, org, &mut org_new, true, rng) {
        trace!(
            "Vessel {} is not feasible after removing cargo {}",
            org,
            cargo_id
        );
        return None;
    }
    Some(org_new)
}

/// Move a cargo from one segment to another and join the result into the solution.
///
/// The solution is left untouched and `false` returned if either segment
/// could not be made feasible.
pub fn move_cargo<R: Rng>(
    solution: &mut Solution,
    problem: &Problem,
    mut segments: Vec<Vec<usize>>,
    org: usize,
    dest: usize,
    cargo_id: usize,
    rng: &mut R,
) -> bool {
    debug_assert_ne!(org, dest);

    let Some(dest_new) = add_cargo(problem, &segments, dest, cargo_id, rng) else {
        return false;
    };
    let Some(org_new) = remove_cargo(problem, &segments, org, cargo_id, rng) else {
        return false;
    };

    segments[dest] = dest_new;
    segments[org] = org_new;
    solution.join_from_segments(segments);
    true
}

/// Vessels other than `except` able to carry the cargo.
pub fn compatible_vessels(problem: &Problem, cargo_id: usize, except: usize) -> Vec<usize> {
    (0..problem.nr_of_vessels())
        .filter(|&v| v != except && problem.can_carry(v, cargo_id))
        .collect()
}
