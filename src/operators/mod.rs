//! Neighborhood operators.
//!
//! Every operator mutates a solution in place and leaves it valid, though not
//! necessarily feasible. An operator that finds no feasible move leaves the
//! solution untouched.

pub mod cargo_moves;
pub mod escape;
pub mod exchange;
pub mod reinsert;
pub mod utils;

use crate::problem::Problem;
use crate::solution::Solution;
use crate::weights::OperatorCharacteristic;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operator applied to the current solution to create a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    /// Exchange the positions of two cargoes
    TwoExchange,
    /// Rotate the positions of three cargoes
    ThreeExchange,
    /// Move one cargo to another vessel or to the spot carrier
    ReinsertOnce { vessel_bias: f64 },
    /// Move a cargo from the spot carrier into a vessel
    MinimizeNotTransported,
    /// Rearrange the vessel waiting the longest at ports
    MinimizeWaitTime,
    /// Gather cargoes sharing a port into one vessel
    MoveSimilarCargo,
}

impl Operator {
    /// Apply the operator to the solution.
    pub fn operate<R: Rng>(&self, solution: &mut Solution, problem: &Problem, rng: &mut R) {
        match *self {
            Operator::TwoExchange => exchange::two_exchange(solution, problem, rng),
            Operator::ThreeExchange => exchange::three_exchange(solution, problem, rng),
            Operator::ReinsertOnce { vessel_bias } => {
                reinsert::reinsert_once(solution, problem, vessel_bias, rng);
            }
            Operator::MinimizeNotTransported => {
                cargo_moves::minimize_not_transported(solution, problem, rng);
            }
            Operator::MinimizeWaitTime => {
                cargo_moves::minimize_wait_time(solution, problem, rng);
            }
            Operator::MoveSimilarCargo => {
                cargo_moves::move_similar_cargo(solution, problem, rng);
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::TwoExchange => "two_exchange",
            Operator::ThreeExchange => "three_exchange",
            Operator::ReinsertOnce { .. } => "reinsert_once",
            Operator::MinimizeNotTransported => "minimize_not_transported",
            Operator::MinimizeWaitTime => "minimize_wait_time",
            Operator::MoveSimilarCargo => "move_similar_cargo",
        }
    }

    /// When in the search the operator is expected to do well.
    pub fn characteristic(&self) -> OperatorCharacteristic {
        match self {
            Operator::MinimizeNotTransported => OperatorCharacteristic::Early,
            Operator::ThreeExchange => OperatorCharacteristic::Late,
            _ => OperatorCharacteristic::Neutral,
        }
    }

    /// Operator pool of the adaptive search.
    pub fn default_pool() -> Vec<Operator> {
        vec![
            Operator::MinimizeNotTransported,
            Operator::MinimizeWaitTime,
            Operator::MoveSimilarCargo,
            Operator::ReinsertOnce { vessel_bias: 0.75 },
            Operator::ThreeExchange,
        ]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::ReinsertOnce { vessel_bias } => {
                write!(f, "{}({})", self.name(), vessel_bias)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// A disruptive operator applied when the search stagnates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeOperator {
    /// Move several cargoes to the spot carrier
    MoveToSpotCarrier,
    /// Reinsert several cargoes into other vessels
    ReinsertN,
}

impl EscapeOperator {
    pub const ALL: [EscapeOperator; 2] = [
        EscapeOperator::MoveToSpotCarrier,
        EscapeOperator::ReinsertN,
    ];

    pub fn operate<R: Rng>(&self, solution: &mut Solution, problem: &Problem, rng: &mut R) {
        match self {
            EscapeOperator::MoveToSpotCarrier => {
                escape::move_to_spot_carrier(solution, problem, rng)
            }
            EscapeOperator::ReinsertN => escape::reinsert_n(solution, problem, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EscapeOperator::MoveToSpotCarrier => "move_to_spot_carrier",
            EscapeOperator::ReinsertN => "reinsert_n",
        }
    }
}
