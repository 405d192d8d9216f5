//! Tests for the adaptive operator weights.

use pdp_anneal::weights::{step_score, OperatorCharacteristic, OperatorWeights};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const EPSILON: f64 = 1e-9;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < EPSILON, "{} != {}", a, b);
}

#[test]
fn test_initial_weights() {
    let weights = OperatorWeights::new(vec![
        OperatorCharacteristic::Early,
        OperatorCharacteristic::Neutral,
        OperatorCharacteristic::Late,
    ]);

    assert_eq!(weights.len(), 3);
    assert_close(weights.weights()[0], 1.25 / 3.25);
    assert_close(weights.weights()[1], 1.0 / 3.25);
    assert_close(weights.weights()[2], 1.0 / 3.25);
    assert_close(weights.weights().iter().sum(), 1.0);
    assert_close(*weights.cumulative().last().unwrap(), 1.0);
}

#[test]
fn test_modifiers() {
    use OperatorCharacteristic::*;

    assert_close(Neutral.modifier(0.0), 1.0);
    assert_close(Neutral.modifier(0.9), 1.0);

    assert_close(Early.modifier(0.0), 1.25);
    assert_close(Early.modifier(0.25), 1.0);
    assert_close(Early.modifier(0.5), 0.9);

    assert_close(Late.modifier(0.1), 1.0);
    assert_close(Late.modifier(0.25), 1.0);
    assert_close(Late.modifier(0.5), 1.25);
    assert_close(Late.modifier(1.0), 1.5);
}

#[test]
fn test_select_with_boundaries() {
    let weights = OperatorWeights::from_probabilities(&[0.2, 0.3, 0.5]);

    assert_eq!(weights.select_with(0.0), 0);
    assert_eq!(weights.select_with(0.19), 0);
    // a roll equal to a cumulative bound belongs to the next operator
    assert_eq!(weights.select_with(weights.cumulative()[0]), 1);
    assert_eq!(weights.select_with(0.6), 2);
    assert_eq!(weights.select_with(0.999_999), 2);
}

#[test]
fn test_from_probabilities_normalizes() {
    let weights = OperatorWeights::from_probabilities(&[1.0, 3.0]);

    assert_close(weights.weights()[0], 0.25);
    assert_close(weights.weights()[1], 0.75);
}

#[test]
fn test_recalculate() {
    let mut weights = OperatorWeights::new(vec![OperatorCharacteristic::Neutral; 2]);
    weights.record(0, 2.0);
    weights.record(0, 0.0);
    assert_eq!(weights.segment_score(0), (2.0, 2));

    weights.recalculate(0.5);

    // 0.5 / 2 + 2 / 2 for the selected operator, the other keeps 0.5
    assert_close(weights.weights()[0], 1.25 / 1.75);
    assert_close(weights.weights()[1], 0.5 / 1.75);
    assert_eq!(weights.segment_score(0), (0.0, 0));
    assert_eq!(weights.segment_score(1), (0.0, 0));
}

#[test]
fn test_negative_scores_only_halve_weight() {
    let mut weights = OperatorWeights::new(vec![OperatorCharacteristic::Neutral; 2]);
    weights.record(0, -1.0);
    weights.record(1, -0.5);
    weights.record(1, 1.5);

    weights.recalculate(0.0);

    // 0.25 against 0.25 + 0.5
    assert_close(weights.weights()[0], 0.25);
    assert_close(weights.weights()[1], 0.75);
}

#[test]
fn test_recalculate_applies_modifier() {
    let mut weights = OperatorWeights::new(vec![
        OperatorCharacteristic::Late,
        OperatorCharacteristic::Neutral,
    ]);
    weights.record(0, 1.0);
    weights.record(1, 1.0);

    weights.recalculate(1.0);

    // 0.25 + 1.5 against 0.25 + 1.0
    assert_close(weights.weights()[0], 1.75 / 3.0);
    assert_close(weights.weights()[1], 1.25 / 3.0);
}

#[test]
fn test_selection_is_reproducible() {
    let weights = OperatorWeights::from_probabilities(&[0.1, 0.2, 0.3, 0.4]);
    let mut a = ChaCha8Rng::seed_from_u64(1234);
    let mut b = ChaCha8Rng::seed_from_u64(1234);

    let first = (0..100).map(|_| weights.select(&mut a)).collect::<Vec<_>>();
    let second = (0..100).map(|_| weights.select(&mut b)).collect::<Vec<_>>();
    assert_eq!(first, second);
    assert!(first.iter().all(|&i| i < 4));
}

#[test]
fn test_selection_follows_weights() {
    let weights = OperatorWeights::from_probabilities(&[0.1, 0.9]);
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    let picked_second = (0..10_000)
        .filter(|_| weights.select(&mut rng) == 1)
        .count();
    assert!(picked_second > 8_500 && picked_second < 9_500);
}

#[test]
fn test_step_scores() {
    // improving, taboo, feasible, global best
    assert_close(step_score(true, false, true, true), 2.0);
    assert_close(step_score(true, false, true, false), 1.0);
    assert_close(step_score(true, true, true, false), 0.75);
    assert_close(step_score(false, false, true, false), 0.25);
    assert_close(step_score(true, false, false, false), 0.0);
    assert_close(step_score(false, true, false, false), -1.0);
}

#[test]
fn test_step_score_ignores_best_without_accepted_improvement() {
    assert_close(step_score(true, true, true, true), step_score(true, true, true, false));
    assert_close(step_score(true, false, false, true), step_score(true, false, false, false));
    assert_close(step_score(false, false, true, true), step_score(false, false, true, false));
}
