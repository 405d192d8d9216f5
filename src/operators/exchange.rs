//! Exchange neighborhoods: swap the positions of two or three cargoes.
//!
//! Swapping every occurrence of a cargo id keeps the solution valid. A cargo
//! takes over the pickup and delivery positions of the cargo it is exchanged
//! with, possibly in another vessel.

use crate::problem::Problem;
use crate::solution::{Solution, BARRIER};
use log::trace;
use rand::seq::index;
use rand::Rng;

/// Exchange the positions of two random cargoes.
pub fn two_exchange<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) {
    let nr_of_cargo = problem.nr_of_cargo();
    if nr_of_cargo < 2 {
        return;
    }

    let picked = index::sample(rng, nr_of_cargo, 2);
    let (a, b) = (picked.index(0) + 1, picked.index(1) + 1);
    trace!("Exchanging cargo {} and {}", a, b);

    for element in solution.arr_mut() {
        if *element == a {
            *element = b;
        } else if *element == b {
            *element = a;
        }
    }
    solution.refresh();
}

/// Rotate the positions of three random cargoes.
///
/// Falls back to [`two_exchange`] when there are fewer than three cargoes.
pub fn three_exchange<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) {
    let nr_of_cargo = problem.nr_of_cargo();
    if nr_of_cargo < 3 {
        two_exchange(solution, problem, rng);
        return;
    }

    let picked = index::sample(rng, nr_of_cargo, 3);
    let (a, b, c) = (
        picked.index(0) + 1,
        picked.index(1) + 1,
        picked.index(2) + 1,
    );
    trace!("Rotating cargo {} -> {} -> {}", a, b, c);

    for element in solution.arr_mut() {
        match *element {
            BARRIER => {}
            id if id == a => *element = b,
            id if id == b => *element = c,
            id if id == c => *element = a,
            _ => {}
        }
    }
    solution.refresh();
}
