//! Short-term memory of recently accepted solutions.

use crate::solution::Solution;
use log::debug;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// A bounded, recency ordered set of solution fingerprints.
///
/// The bound shrinks while the search stagnates and is restored as soon as an
/// improvement is found. Two different solutions sharing a fingerprint are
/// treated as the same solution.
#[derive(Debug, Clone)]
pub struct TabuMemory {
    min_size: usize,
    max_size: usize,
    current_max_size: usize,
    /// Oldest fingerprint at the front
    order: VecDeque<u64>,
    members: FxHashSet<u64>,
}

impl TabuMemory {
    /// Create a memory sized relative to the total number of iterations.
    ///
    /// The size stays within `max(1, min_fraction * iterations)` and
    /// `max(min + 1, max_fraction * iterations)`.
    pub fn new(iterations: usize, min_fraction: f64, max_fraction: f64) -> Self {
        let min_size = ((iterations as f64 * min_fraction) as usize).max(1);
        let max_size = ((iterations as f64 * max_fraction) as usize).max(min_size + 1);
        Self::with_bounds(min_size, max_size)
    }

    /// Create a memory with explicit bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min_size` is zero or not below `max_size`.
    pub fn with_bounds(min_size: usize, max_size: usize) -> Self {
        assert!(min_size > 0, "Minimum tabu size must be positive");
        assert!(
            min_size < max_size,
            "Minimum tabu size ({}) must be below the maximum ({})",
            min_size,
            max_size
        );
        debug!(
            "There can be between {} and {} taboo solutions registered",
            min_size, max_size
        );

        TabuMemory {
            min_size,
            max_size,
            current_max_size: max_size,
            order: VecDeque::with_capacity(max_size + 1),
            members: FxHashSet::default(),
        }
    }

    /// Record a solution as the youngest member.
    pub fn push(&mut self, solution: &Solution) {
        self.push_fingerprint(solution.fingerprint());
    }

    /// Record a fingerprint as the youngest member, promoting it if already present.
    pub fn push_fingerprint(&mut self, fingerprint: u64) {
        if !self.members.insert(fingerprint) {
            if let Some(position) = self.order.iter().position(|&f| f == fingerprint) {
                self.order.remove(position);
            }
        }
        self.order.push_back(fingerprint);
        self.evict();
    }

    /// Check if a solution was recently seen.
    pub fn check_taboo(&self, solution: &Solution) -> bool {
        self.contains(solution.fingerprint())
    }

    /// Check if a fingerprint is a member.
    pub fn contains(&self, fingerprint: u64) -> bool {
        self.members.contains(&fingerprint)
    }

    /// Shrink the bound by one, never below the minimum size.
    pub fn reduce_size(&mut self) {
        self.current_max_size = self.current_max_size.saturating_sub(1).max(self.min_size);
        self.evict();
    }

    /// Restore the bound to the maximum size.
    pub fn reset_size(&mut self) {
        self.current_max_size = self.max_size;
    }

    fn evict(&mut self) {
        while self.order.len() > self.current_max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn current_max_size(&self) -> usize {
        self.current_max_size
    }
}
