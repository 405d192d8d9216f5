//! End-to-end tests of the search algorithms.

use pdp_anneal::algorithm::Algorithm;
use pdp_anneal::annealing::AdaptiveAnnealing;
use pdp_anneal::config::{fraction_of, AlgorithmKind, Config};
use pdp_anneal::local_search::LocalSearch;
use pdp_anneal::problem::{Cargo, PortService, Problem, Sailing, Vessel};
use pdp_anneal::simulated_annealing::SimulatedAnnealing;
use pdp_anneal::solution::Solution;
use pdp_anneal::Solver;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Creates a problem with three vessels and ten cargoes over five ports.
///
/// Leaving a cargo to the spot carrier is far more expensive than sailing it,
/// so any reasonable search moves cargo into the vessels.
fn create_test_problem() -> Problem {
    let nr_of_ports = 5;
    let vessels = (0..3)
        .map(|v| {
            let compatible = (1..=10).filter(|&id| v != 2 || id <= 6).collect();
            Vessel::new(v, v as i64 * 2, 15, compatible)
        })
        .collect::<Vec<_>>();

    let cargoes = (0..10)
        .map(|i| {
            let origin = i % nr_of_ports;
            let dest = (i + 2) % nr_of_ports;
            let lower = (i as i64 % 3) * 10;
            Cargo::new(
                origin,
                dest,
                2 + (i % 3) as i64,
                2_000 + 50 * i as i64,
                lower,
                lower + 150,
                lower,
                lower + 300,
            )
        })
        .collect::<Vec<_>>();

    let mut sailings = Vec::new();
    for v in 0..3 {
        for from in 0..nr_of_ports {
            for to in 0..nr_of_ports {
                let distance = from.abs_diff(to) as i64;
                sailings.push((
                    (v, from, to),
                    Sailing {
                        time: 3 * distance,
                        cost: (20 + 5 * v as i64) * distance,
                    },
                ));
            }
        }
    }

    let mut services = Vec::new();
    for (v, vessel) in vessels.iter().enumerate() {
        for &id in &vessel.compatible {
            services.push((
                (v, id),
                PortService {
                    origin_time: 1,
                    origin_cost: 15,
                    dest_time: 1,
                    dest_cost: 25,
                },
            ));
        }
    }

    Problem::new(
        "SearchProblem".to_string(),
        nr_of_ports,
        vessels,
        cargoes,
        sailings,
        services,
    )
    .expect("test problem is complete")
}

/// Creates a problem with two vessels and three cargoes on three ports.
///
/// The search space is small enough that the search settles on one plan and
/// then stagnates.
fn create_small_problem() -> Problem {
    let nr_of_ports = 3;
    let vessels = (0..2)
        .map(|v| Vessel::new(v, 0, 10, vec![1, 2, 3]))
        .collect::<Vec<_>>();
    let cargoes = (0..3)
        .map(|i| Cargo::new(i, (i + 1) % nr_of_ports, 3, 1_000, 0, 200, 0, 400))
        .collect::<Vec<_>>();

    let mut sailings = Vec::new();
    for v in 0..2 {
        for from in 0..nr_of_ports {
            for to in 0..nr_of_ports {
                let distance = from.abs_diff(to) as i64;
                sailings.push((
                    (v, from, to),
                    Sailing {
                        time: 2 * distance,
                        cost: (10 + 3 * v as i64) * distance,
                    },
                ));
            }
        }
    }

    let mut services = Vec::new();
    for v in 0..2 {
        for id in 1..=3 {
            services.push((
                (v, id),
                PortService {
                    origin_time: 1,
                    origin_cost: 5,
                    dest_time: 1,
                    dest_cost: 5,
                },
            ));
        }
    }

    Problem::new(
        "SmallProblem".to_string(),
        nr_of_ports,
        vessels,
        cargoes,
        sailings,
        services,
    )
    .expect("small problem is complete")
}

fn assert_close_relative(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-6 * b.abs(), "{} != {}", a, b);
}

fn standard_value(problem: &Problem) -> i64 {
    Solution::standard(problem).objective_value(problem, true)
}

#[test]
fn test_adaptive_annealing_improves() {
    let problem = create_test_problem();
    let initial = Solution::standard(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut search = AdaptiveAnnealing::new(Config::new());
    let mut best = search.search(&problem, &initial, 2_000, &mut rng);

    assert!(best.is_valid());
    assert!(best.is_feasible(&problem, true, true));
    assert!(best.objective_value(&problem, true) < standard_value(&problem));

    let statistics = &search.statistics;
    assert!(statistics.improvements > 0);
    assert!(statistics.global_bests > 0);
    assert_eq!(statistics.segments, 100);
    assert_eq!(statistics.final_weights.len(), search.operators.len());
    assert!((statistics.final_weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(statistics.final_temperature < statistics.initial_temperature);
    assert_close_relative(statistics.final_temperature, search.config.final_temperature);
}

#[test]
fn test_adaptive_annealing_is_reproducible() {
    let problem = create_test_problem();
    let initial = Solution::standard(&problem);

    let run = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        AdaptiveAnnealing::new(Config::new()).search(&problem, &initial, 1_000, &mut rng)
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_adaptive_annealing_with_few_iterations() {
    let problem = create_test_problem();
    let initial = Solution::standard(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for iterations in [0, 1, 5, 50, 150, 199] {
        let mut search = AdaptiveAnnealing::new(Config::new());
        let mut best = search.search(&problem, &initial, iterations, &mut rng);
        assert!(best.is_feasible(&problem, true, true));
        assert!(best.objective_value(&problem, true) <= standard_value(&problem));

        // Below one iteration per segment every iteration is a search step.
        let statistics = &search.statistics;
        assert_eq!(statistics.segments, 0);
        assert_eq!(
            statistics.improvements
                + statistics.accepted_worse
                + statistics.rejected
                + statistics.infeasible,
            iterations
        );
        if iterations > 0 {
            assert_close_relative(
                statistics.final_temperature,
                search.config.final_temperature,
            );
        }
        if iterations >= 150 {
            assert!(statistics.improvements > 0);
            assert!(best.objective_value(&problem, true) < standard_value(&problem));
        }
    }
}

#[test]
fn test_adaptive_annealing_escapes_from_stagnation() {
    let problem = create_small_problem();
    let initial = Solution::standard(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let iterations = 2_000;

    let config = Config::new().with_tabu_fractions(0.01, 0.05);
    let escape_threshold = fraction_of(iterations, config.escape_fraction);
    let mut search = AdaptiveAnnealing::new(config);
    let mut best = search.search(&problem, &initial, iterations, &mut rng);
    assert!(best.is_feasible(&problem, true, true));

    let statistics = &search.statistics;
    assert!(statistics.escapes > 0);
    assert_eq!(statistics.escape_streaks.len(), statistics.escapes);
    assert!(statistics
        .escape_streaks
        .iter()
        .all(|&streak| streak > 0 && streak % escape_threshold == 0));
    // The streak starts over after every accepted improvement.
    assert!(statistics.escape_streaks.contains(&escape_threshold));
    assert!(statistics.tabu_reductions > 0);
    assert!(statistics.accepted_worse > 0);
    assert!(statistics.taboo_hits > 0);
}

#[test]
fn test_adaptive_annealing_step_accounting() {
    let problem = create_small_problem();
    let initial = Solution::standard(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let iterations = 1_000;

    let config = Config::new().with_tabu_fractions(0.01, 0.05);
    let mut search = AdaptiveAnnealing::new(config);
    search.search(&problem, &initial, iterations, &mut rng);

    let statistics = &search.statistics;
    let steps = iterations - statistics.segments;
    assert_eq!(statistics.segments, 100);
    assert_eq!(
        statistics.improvements
            + statistics.accepted_worse
            + statistics.rejected
            + statistics.infeasible,
        steps
    );
    // Taboo candidates are never counted as improvements.
    assert!(statistics.improvements + statistics.taboo_hits <= steps);
    assert!(statistics.global_bests <= statistics.improvements);
    assert!(statistics.global_bests > 0);
}

#[test]
fn test_local_search_improves() {
    let problem = create_test_problem();
    let initial = Solution::standard(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut best = LocalSearch::default().search(&problem, &initial, 1_000, &mut rng);

    assert!(best.is_feasible(&problem, true, true));
    assert!(best.objective_value(&problem, true) < standard_value(&problem));
}

#[test]
#[should_panic]
fn test_local_search_rejects_invalid_probabilities() {
    LocalSearch::new(0.6, 0.5);
}

#[test]
fn test_simulated_annealing_presets() {
    let problem = create_test_problem();
    let initial = Solution::standard(&problem);

    for mut search in [
        SimulatedAnnealing::classic(Config::new()),
        SimulatedAnnealing::cargo_aware(Config::new()),
    ] {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut best = search.search(&problem, &initial, 1_000, &mut rng);
        assert!(best.is_feasible(&problem, true, true));
        assert!(best.objective_value(&problem, true) < standard_value(&problem));
    }
}

#[test]
fn test_simulated_annealing_operator_table() {
    let search = SimulatedAnnealing::cargo_aware(Config::new());

    assert_eq!(search.pick_operator(0.0), search.table[0].1);
    assert_eq!(search.pick_operator(0.6), search.table[1].1);
    assert_eq!(search.pick_operator(0.95), search.fallback);
}

#[test]
fn test_solver_runs_every_algorithm() {
    let problem = create_test_problem();

    for algorithm in [
        AlgorithmKind::Adaptive,
        AlgorithmKind::Annealing,
        AlgorithmKind::LocalSearch,
    ] {
        let config = Config::new()
            .with_algorithm(algorithm)
            .with_iterations(500)
            .with_seed(3);
        let mut solver = Solver::new(problem.clone(), config);
        let mut best = solver.run().clone();

        assert!(best.is_feasible(&problem, true, true));
        assert_eq!(solver.best_objective, best.objective_value(&problem, true));
        assert_eq!(solver.initial_objective, standard_value(&problem));
        assert_eq!(solver.seed, 3);
        assert_eq!(
            solver.statistics.is_some(),
            algorithm == AlgorithmKind::Adaptive
        );

        let report = solver.report().expect("solver has run");
        assert_eq!(report.algorithm, algorithm);
        assert!(report.feasible);
        assert_eq!(report.sequence, best.arr().to_vec());
        assert!(report.improvement >= 0.0);
    }
}

#[test]
fn test_solver_report_before_run() {
    let solver = Solver::new(create_test_problem(), Config::new());
    assert!(solver.report().is_none());
}

#[test]
fn test_report_serializes() {
    let mut solver = Solver::new(
        create_test_problem(),
        Config::new().with_iterations(200).with_seed(11),
    );
    solver.run();
    let report = solver.report().expect("solver has run");

    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains("\"instance\":\"SearchProblem\""));
    assert!(json.contains("\"algorithm\":\"adaptive\""));
    assert!(report.format().contains("SearchProblem"));
}
