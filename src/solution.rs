//! Solution representation for the pickup and delivery problem.
//!
//! A solution is a flat sequence of `2 * nr_of_cargo + nr_of_vessels`
//! elements. [`BARRIER`] elements split it into one segment per vessel,
//! followed by a final segment holding the cargoes left to the spot carrier.
//! Every cargo id appears exactly twice: the first occurrence within a segment
//! is the pickup and the second the delivery.
//!
//! The segment boundaries are cached. The cache is *not* tracked
//! automatically: after mutating the sequence through [`Solution::arr_mut`]
//! the caller must either call [`Solution::refresh`] or pass `modified = true`
//! to the next query.

use crate::problem::{Cargo, Problem};
use anyhow::{bail, Result};
use itertools::Itertools;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// The element separating the segments of two vessels.
pub const BARRIER: usize = 0;

/// Sentinel wait time of a stop that was never reached.
pub const NOT_VISITED: i64 = -1;

/// Result of simulating a vessel sailing one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VesselRouteMetadata {
    pub vessel_index: usize,
    pub feasible: bool,
    /// Time spent waiting for the window to open at each stop, [`NOT_VISITED`] if never reached
    pub wait_times: Vec<i64>,
    /// Sailing and port costs accumulated up to the last simulated stop
    pub cost: i64,
}

impl VesselRouteMetadata {
    /// Total time spent waiting at the stops that were reached.
    pub fn total_wait(&self) -> i64 {
        self.wait_times.iter().filter(|&&wait| wait > 0).sum()
    }

    /// Position of the stop with the longest wait, if any stop was waited at.
    pub fn longest_wait(&self) -> Option<usize> {
        self.wait_times
            .iter()
            .position_max()
            .filter(|&index| self.wait_times[index] > 0)
    }
}

/// A complete solution encoded as a flat sequence.
#[derive(Clone, Serialize, Deserialize)]
pub struct Solution {
    arr: Vec<usize>,
    nr_of_vessels: usize,
    nr_of_cargo: usize,
    /// Half-open boundaries of every segment
    #[serde(skip)]
    ranges: Vec<Range<usize>>,
    /// Copy of every segment
    #[serde(skip)]
    segments: Vec<Vec<usize>>,
}

impl Solution {
    /// Create a solution from a raw sequence.
    ///
    /// The sequence must have the length the problem demands. It is not
    /// checked for validity, use [`Solution::is_valid`] for that.
    pub fn from_vec(problem: &Problem, arr: Vec<usize>) -> Result<Self> {
        if arr.len() != problem.solution_length() {
            bail!(
                "Given solution is not compatible with instance {}. Expected a sequence of length {} but got {}",
                problem.name,
                problem.solution_length(),
                arr.len()
            );
        }

        let mut solution = Solution {
            arr,
            nr_of_vessels: problem.nr_of_vessels(),
            nr_of_cargo: problem.nr_of_cargo(),
            ranges: Vec::new(),
            segments: Vec::new(),
        };
        if solution.barrier_count() == solution.nr_of_vessels {
            solution.refresh();
        }
        Ok(solution)
    }

    /// Generate the solution where every cargo is left to the spot carrier.
    ///
    /// This solution is always valid and feasible.
    pub fn standard(problem: &Problem) -> Self {
        let mut arr = Vec::with_capacity(problem.solution_length());
        arr.extend(std::iter::repeat(BARRIER).take(problem.nr_of_vessels()));
        for cargo_id in 1..=problem.nr_of_cargo() {
            arr.push(cargo_id);
            arr.push(cargo_id);
        }

        let mut solution = Solution {
            arr,
            nr_of_vessels: problem.nr_of_vessels(),
            nr_of_cargo: problem.nr_of_cargo(),
            ranges: Vec::new(),
            segments: Vec::new(),
        };
        solution.refresh();
        solution
    }

    /// Generate a random valid (but not necessarily feasible) solution by
    /// placing each cargo in a random segment.
    pub fn random<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let mut segments = vec![Vec::new(); problem.nr_of_vessels() + 1];
        for cargo_id in 1..=problem.nr_of_cargo() {
            let segment = rng.gen_range(0..segments.len());
            segments[segment].push(cargo_id);
            segments[segment].push(cargo_id);
        }

        let mut solution = Solution::standard(problem);
        solution.join_from_segments(segments);
        solution
    }

    /// The raw sequence.
    pub fn arr(&self) -> &[usize] {
        &self.arr
    }

    /// Mutable access to the raw sequence.
    ///
    /// The segment cache is stale until [`Solution::refresh`] is called or a
    /// query is made with `modified = true`.
    pub fn arr_mut(&mut self) -> &mut [usize] {
        &mut self.arr
    }

    /// Number of vessel segments (the spot carrier segment excluded).
    pub fn nr_of_vessels(&self) -> usize {
        self.nr_of_vessels
    }

    /// Number of cargoes encoded in this solution.
    pub fn nr_of_cargo(&self) -> usize {
        self.nr_of_cargo
    }

    /// Index of the spot carrier segment.
    pub fn spot_index(&self) -> usize {
        self.nr_of_vessels
    }

    fn barrier_count(&self) -> usize {
        self.arr.iter().filter(|&&element| element == BARRIER).count()
    }

    /// Recompute the segment cache from the barrier positions.
    ///
    /// # Panics
    ///
    /// Panics if the number of barriers does not match the number of vessels.
    pub fn refresh(&mut self) {
        self.ranges.clear();

        let mut from = 0;
        for (index, &element) in self.arr.iter().enumerate() {
            if element == BARRIER {
                self.ranges.push(from..index);
                from = index + 1;
            }
        }
        assert_eq!(
            self.ranges.len(),
            self.nr_of_vessels,
            "Number of barriers found does not match the expected amount for solution {}",
            self
        );
        self.ranges.push(from..self.arr.len());

        self.segments.resize_with(self.ranges.len(), Vec::new);
        for (segment, range) in self.segments.iter_mut().zip(&self.ranges) {
            segment.clear();
            segment.extend_from_slice(&self.arr[range.clone()]);
        }

        trace!("Split {} into ranges {:?}", self, self.ranges);
    }

    /// Boundaries of every segment, the last one being the spot carrier.
    pub fn segment_ranges(&mut self, modified: bool) -> &[Range<usize>] {
        if modified || self.ranges.is_empty() {
            self.refresh();
        }
        &self.ranges
    }

    /// Split the sequence into one array per segment.
    ///
    /// When `modified` is `false` the cached segments are returned as is.
    pub fn split_into_segments(&mut self, modified: bool) -> &[Vec<usize>] {
        if modified || self.ranges.is_empty() {
            self.refresh();
        }
        &self.segments
    }

    /// Join segments back into the sequence, placing a barrier after every
    /// segment but the last. The cache is updated so no refresh is needed
    /// afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the segments do not fill the sequence exactly.
    pub fn join_from_segments(&mut self, segments: Vec<Vec<usize>>) {
        assert_eq!(
            segments.len(),
            self.nr_of_vessels + 1,
            "Expected one segment per vessel plus the spot carrier"
        );
        let total: usize = segments.iter().map(Vec::len).sum::<usize>() + self.nr_of_vessels;
        assert_eq!(
            total,
            self.arr.len(),
            "Given segments do not have the total size of this solution's sequence"
        );

        self.ranges.clear();
        let mut offset = 0;
        for (index, segment) in segments.iter().enumerate() {
            self.arr[offset..offset + segment.len()].copy_from_slice(segment);
            self.ranges.push(offset..offset + segment.len());
            offset += segment.len();

            if index != self.nr_of_vessels {
                self.arr[offset] = BARRIER;
                offset += 1;
            }
        }
        self.segments = segments;
    }

    /// Check if the solution is valid (but not necessarily feasible).
    ///
    /// A solution is valid when it has one barrier per vessel, every cargo id
    /// appears exactly twice, and both occurrences are in the same segment.
    pub fn is_valid(&self) -> bool {
        let barriers = self.barrier_count();
        if barriers != self.nr_of_vessels {
            debug!(
                "Expected {} barriers but found {} in {}",
                self.nr_of_vessels, barriers, self
            );
            return false;
        }

        let mut total = vec![0u8; self.nr_of_cargo + 1];
        let mut in_segment = vec![0u8; self.nr_of_cargo + 1];

        for segment in self.arr.split(|&element| element == BARRIER) {
            if segment.len() % 2 != 0 {
                debug!("Segment {:?} has an odd length", segment);
                return false;
            }
            for &cargo_id in segment {
                if cargo_id > self.nr_of_cargo {
                    debug!("Unknown cargo {} in {}", cargo_id, self);
                    return false;
                }
                in_segment[cargo_id] = in_segment[cargo_id].saturating_add(1);
                total[cargo_id] = total[cargo_id].saturating_add(1);
            }
            if let Some(&cargo_id) = segment.iter().find(|&&id| in_segment[id] != 2) {
                debug!(
                    "Cargo {} does not appear exactly twice in segment {:?}",
                    cargo_id, segment
                );
                return false;
            }
            for &cargo_id in segment {
                in_segment[cargo_id] = 0;
            }
        }

        total[1..].iter().all(|&count| count == 2)
    }

    /// Check the feasibility of this solution.
    ///
    /// When `check_valid` is set an invalid solution is reported infeasible,
    /// otherwise validity is assumed.
    pub fn is_feasible(&mut self, problem: &Problem, modified: bool, check_valid: bool) -> bool {
        if check_valid && !self.is_valid() {
            debug!("Solution {} is not valid", self);
            return false;
        }

        self.split_into_segments(modified)
            .iter()
            .enumerate()
            .all(|(vessel, segment)| Self::is_vessel_feasible(problem, vessel, segment))
    }

    /// Check if a single segment is feasible for the given vessel index.
    pub fn is_vessel_feasible(problem: &Problem, vessel_index: usize, segment: &[usize]) -> bool {
        Self::evaluate_segment(problem, vessel_index, segment).feasible
    }

    /// Simulate a vessel sailing the given segment in order.
    ///
    /// The spot carrier segment (`vessel_index == nr_of_vessels`) is always
    /// feasible and costs the not-transported penalty of every cargo in it.
    /// Simulation of a vessel stops at the first violated constraint.
    pub fn evaluate_segment(
        problem: &Problem,
        vessel_index: usize,
        segment: &[usize],
    ) -> VesselRouteMetadata {
        let mut metadata = VesselRouteMetadata {
            vessel_index,
            feasible: true,
            wait_times: vec![NOT_VISITED; segment.len()],
            cost: 0,
        };

        if vessel_index == problem.nr_of_vessels() {
            metadata.cost = Self::spot_cost(problem, segment);
            return metadata;
        }

        let vessel = problem.vessel(vessel_index);
        let mut seen = vec![false; problem.nr_of_cargo()];
        let mut time = vessel.start_time;
        let mut weight = 0;
        let mut port = vessel.home_port;

        for (index, &cargo_id) in segment.iter().enumerate() {
            let cargo = problem.cargo(cargo_id);
            let pickup = !seen[cargo_id - 1];
            let next_port = if pickup {
                cargo.origin_port
            } else {
                cargo.dest_port
            };

            let sailing = problem.sailing(vessel_index, port, next_port);
            time += sailing.time;
            metadata.cost += sailing.cost;

            let Some(service) = problem.service(vessel_index, cargo_id) else {
                trace!("Vessel {} is not compatible with {}", vessel_index, cargo_id);
                metadata.feasible = false;
                return metadata;
            };

            let within_window = if pickup {
                seen[cargo_id - 1] = true;
                weight += cargo.size;
                metadata.cost += service.origin_cost;
                check_window(
                    &mut metadata.wait_times[index],
                    &mut time,
                    cargo.lower_pickup,
                    cargo.upper_pickup,
                    service.origin_time,
                )
            } else {
                weight -= cargo.size;
                metadata.cost += service.dest_cost;
                check_window(
                    &mut metadata.wait_times[index],
                    &mut time,
                    cargo.lower_delivery,
                    cargo.upper_delivery,
                    service.dest_time,
                )
            };

            if !within_window {
                trace!(
                    "Vessel {} misses the {} window of cargo {}",
                    vessel_index,
                    if pickup { "pickup" } else { "delivery" },
                    cargo_id
                );
                metadata.feasible = false;
                return metadata;
            }

            if weight > vessel.capacity {
                trace!(
                    "Vessel {} is carrying more than it has capacity for ({} > {})",
                    vessel_index,
                    weight,
                    vessel.capacity
                );
                metadata.feasible = false;
                return metadata;
            }

            port = next_port;
        }

        metadata
    }

    /// Cost of a segment whether or not it is feasible.
    ///
    /// Port costs of incompatible vessel and cargo pairs count as zero.
    pub fn segment_cost(problem: &Problem, vessel_index: usize, segment: &[usize]) -> i64 {
        if vessel_index == problem.nr_of_vessels() {
            return Self::spot_cost(problem, segment);
        }

        let vessel = problem.vessel(vessel_index);
        let mut seen = vec![false; problem.nr_of_cargo()];
        let mut port = vessel.home_port;
        let mut cost = 0;

        for &cargo_id in segment {
            let cargo: &Cargo = problem.cargo(cargo_id);
            let pickup = !seen[cargo_id - 1];
            let next_port = if pickup {
                cargo.origin_port
            } else {
                cargo.dest_port
            };

            cost += problem.sailing(vessel_index, port, next_port).cost;

            let service = problem
                .service(vessel_index, cargo_id)
                .unwrap_or_default();
            if pickup {
                seen[cargo_id - 1] = true;
                cost += service.origin_cost;
            } else {
                cost += service.dest_cost;
            }

            port = next_port;
        }

        cost
    }

    /// Not-transported penalty of every distinct cargo in the segment.
    fn spot_cost(problem: &Problem, segment: &[usize]) -> i64 {
        segment
            .iter()
            .unique()
            .map(|&cargo_id| problem.cargo(cargo_id).not_transported_cost)
            .sum()
    }

    /// Calculate the objective value. The result is not cached.
    pub fn objective_value(&mut self, problem: &Problem, modified: bool) -> i64 {
        self.split_into_segments(modified)
            .iter()
            .enumerate()
            .map(|(vessel, segment)| Self::segment_cost(problem, vessel, segment))
            .sum()
    }

    /// Find the segment a position of the sequence lies within.
    ///
    /// # Panics
    ///
    /// Panics if the position holds a barrier.
    pub fn vessel_of(&mut self, index: usize, modified: bool) -> usize {
        assert_ne!(
            self.arr[index], BARRIER,
            "Given index corresponds to a barrier element"
        );
        self.segment_ranges(modified)
            .iter()
            .position(|range| range.contains(&index))
            .unwrap_or_else(|| panic!("Failed to find the segment holding index {}", index))
    }

    /// Pick a random vessel (never the spot carrier) carrying at least
    /// `min_cargoes` cargoes.
    pub fn find_non_empty_vessel<R: Rng>(
        &mut self,
        modified: bool,
        min_cargoes: usize,
        rng: &mut R,
    ) -> Option<usize> {
        assert!(min_cargoes > 0, "Minimum number of cargoes must be > 0");
        let nr_of_vessels = self.nr_of_vessels;
        let candidates = self
            .segment_ranges(modified)
            .iter()
            .take(nr_of_vessels)
            .positions(|range| range.len() / 2 >= min_cargoes)
            .collect::<Vec<_>>();
        candidates.choose(rng).copied()
    }

    /// Overwrite another solution with this one, reusing its allocations.
    pub fn copy_into(&self, other: &mut Solution) {
        assert_eq!(
            self.arr.len(),
            other.arr.len(),
            "Cannot copy between solutions of different instances"
        );
        other.arr.copy_from_slice(&self.arr);
        other.ranges.clone_from(&self.ranges);
        other.segments.clone_from(&self.segments);
    }

    /// Position sensitive fingerprint of the sequence.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.arr.hash(&mut hasher);
        hasher.finish()
    }
}

/// Wait for the window to open, serve the port and check the window still holds.
///
/// Records the wait in `wait` and advances `time`.
fn check_window(wait: &mut i64, time: &mut i64, lower: i64, upper: i64, service_time: i64) -> bool {
    *wait = (lower - *time).max(0);
    if *time < lower {
        *time = lower;
    }
    *time += service_time;
    *time <= upper
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.arr == other.arr
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arr.hash(state);
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.arr.iter().join(", "))
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Sequence: {}", self)?;
        for (index, segment) in self.arr.split(|&element| element == BARRIER).enumerate() {
            if index == self.nr_of_vessels {
                writeln!(f, "  Spot carrier: {:?}", segment)?;
            } else {
                writeln!(f, "  Vessel {}: {:?}", index, segment)?;
            }
        }
        Ok(())
    }
}
