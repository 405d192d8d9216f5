//! Adaptive operator weights.
//!
//! Every operator is scored during a segment of the search. At the end of the
//! segment the average score of each operator is blended into its selection
//! probability and the scores are reset.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Score for producing a new global best solution.
pub const GLOBAL_BEST_SCORE: f64 = 1.0;
/// Score for a candidate better than the current solution.
pub const BETTER_SCORE: f64 = 0.5;
/// Score for a candidate not better than the current solution.
pub const WORSE_SCORE: f64 = -0.25;
/// Score for a feasible candidate.
pub const FEASIBLE_SCORE: f64 = 0.5;
/// Score for an infeasible candidate.
pub const INFEASIBLE_SCORE: f64 = -0.5;
/// Score for a candidate found in the tabu memory.
pub const TABOO_SCORE: f64 = -0.25;

/// Score earned by the operator that produced a candidate.
///
/// `global_best` only counts for a feasible improvement outside the tabu memory.
pub fn step_score(improving: bool, taboo: bool, feasible: bool, global_best: bool) -> f64 {
    let mut score = if improving { BETTER_SCORE } else { WORSE_SCORE };
    if taboo {
        score += TABOO_SCORE;
    }
    if feasible {
        score += FEASIBLE_SCORE;
        if global_best && improving && !taboo {
            score += GLOBAL_BEST_SCORE;
        }
    } else {
        score += INFEASIBLE_SCORE;
    }
    score
}

/// When in the search an operator is known to perform well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorCharacteristic {
    /// Nothing is known about the operator
    Neutral,
    /// The operator is good early in the search
    Early,
    /// The operator is good late in the search
    Late,
}

impl OperatorCharacteristic {
    /// Weight before it is normalized against the other operators.
    pub fn initial_weight(self) -> f64 {
        match self {
            OperatorCharacteristic::Neutral => 1.0,
            OperatorCharacteristic::Early => 1.25,
            OperatorCharacteristic::Late => 1.0,
        }
    }

    /// Multiplier applied to the segment score, `progress` being the completed
    /// share of the search in `[0, 1]`.
    pub fn modifier(self, progress: f64) -> f64 {
        match self {
            OperatorCharacteristic::Neutral => 1.0,
            OperatorCharacteristic::Early => {
                if progress <= 0.25 {
                    1.25 - progress
                } else {
                    0.9
                }
            }
            OperatorCharacteristic::Late => {
                if progress <= 0.25 {
                    1.0
                } else {
                    1.0 + progress / 2.0
                }
            }
        }
    }
}

/// Selection probabilities and segment scores of a pool of operators.
#[derive(Debug, Clone)]
pub struct OperatorWeights {
    characteristics: Vec<OperatorCharacteristic>,
    /// Selection probability of each operator, sums to one
    weights: Vec<f64>,
    /// Cumulative probabilities used for selection
    cumulative: Vec<f64>,
    scores: Vec<f64>,
    selected: Vec<usize>,
}

impl OperatorWeights {
    /// Create weights from the characteristic of each operator.
    ///
    /// # Panics
    ///
    /// Panics if no characteristics are given.
    pub fn new(characteristics: Vec<OperatorCharacteristic>) -> Self {
        assert!(
            !characteristics.is_empty(),
            "At least one operator is required"
        );
        let total: f64 = characteristics.iter().map(|c| c.initial_weight()).sum();
        let weights = characteristics
            .iter()
            .map(|c| c.initial_weight() / total)
            .collect::<Vec<_>>();
        let n = characteristics.len();

        let mut operator_weights = OperatorWeights {
            characteristics,
            weights,
            cumulative: Vec::with_capacity(n),
            scores: vec![0.0; n],
            selected: vec![0; n],
        };
        operator_weights.rebuild_cumulative();
        operator_weights
    }

    /// Create weights from explicit probabilities, all characteristics neutral.
    ///
    /// The probabilities are normalized to sum to one.
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        let mut weights =
            Self::new(vec![OperatorCharacteristic::Neutral; probabilities.len()]);
        let total: f64 = probabilities.iter().sum();
        assert!(total > 0.0, "Probabilities must not all be zero");
        weights.weights = probabilities.iter().map(|p| p / total).collect();
        weights.rebuild_cumulative();
        weights
    }

    fn rebuild_cumulative(&mut self) {
        self.cumulative.clear();
        let mut acc = 0.0;
        for weight in &self.weights {
            acc += weight;
            self.cumulative.push(acc);
        }
    }

    /// Pick an operator index at random according to the weights.
    pub fn select<R: Rng>(&self, rng: &mut R) -> usize {
        let roll: f64 = rng.gen();
        self.select_with(roll)
    }

    /// Pick the operator whose cumulative probability interval holds `roll`.
    pub fn select_with(&self, roll: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&bound| roll < bound)
            .unwrap_or(self.cumulative.len() - 1)
    }

    /// Add a score to an operator and count it as selected once.
    pub fn record(&mut self, operator: usize, score: f64) {
        self.scores[operator] += score;
        self.selected[operator] += 1;
    }

    /// Blend the segment scores into the weights and start a new segment.
    ///
    /// Each selected operator gets `old / 2 + max(0, score) / times * modifier(progress)`;
    /// operators that were never selected keep their weight. The result is
    /// normalized to sum to one.
    pub fn recalculate(&mut self, progress: f64) {
        for i in 0..self.weights.len() {
            if self.selected[i] == 0 {
                continue;
            }
            let unbiased = self.scores[i].max(0.0) / self.selected[i] as f64;
            let contribution = unbiased * self.characteristics[i].modifier(progress);
            self.weights[i] = self.weights[i] / 2.0 + contribution;
        }

        let total: f64 = self.weights.iter().sum();
        for weight in &mut self.weights {
            *weight /= total;
        }
        self.rebuild_cumulative();

        self.scores.iter_mut().for_each(|score| *score = 0.0);
        self.selected.iter_mut().for_each(|times| *times = 0);

        debug!("New operator weights {:?}", self.weights);
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Accumulated score and number of selections of an operator this segment.
    pub fn segment_score(&self, operator: usize) -> (f64, usize) {
        (self.scores[operator], self.selected[operator])
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
