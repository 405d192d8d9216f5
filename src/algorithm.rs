//! Common interface of the search algorithms.

use crate::problem::Problem;
use crate::solution::Solution;
use rand::Rng;

/// A search that improves a feasible starting solution.
pub trait Algorithm {
    /// Search for `iterations` iterations starting from `initial`.
    ///
    /// `initial` must be feasible. The returned solution is the best feasible
    /// solution found, which is never worse than `initial`.
    fn search<R: Rng>(
        &mut self,
        problem: &Problem,
        initial: &Solution,
        iterations: usize,
        rng: &mut R,
    ) -> Solution;

    /// Name used in logs and reports.
    fn name(&self) -> &'static str;
}
