//! Tests for the reporting utilities.

use pdp_anneal::problem::{Cargo, PortService, Problem, Sailing, Vessel};
use pdp_anneal::solution::Solution;
use pdp_anneal::utils::{format_duration, save_solution};
use std::time::Duration;

fn create_test_problem() -> Problem {
    let vessels = vec![Vessel::new(0, 0, 10, vec![1, 2])];
    let cargoes = vec![
        Cargo::new(0, 1, 4, 1000, 0, 20, 0, 40),
        Cargo::new(1, 0, 3, 800, 0, 50, 0, 80),
    ];
    let sailings = (0..2usize).flat_map(|from| {
        (0..2usize).map(move |to| {
            let distance = from.abs_diff(to) as i64;
            (
                (0, from, to),
                Sailing {
                    time: 5 * distance,
                    cost: 10 * distance,
                },
            )
        })
    });
    let service = PortService {
        origin_time: 2,
        origin_cost: 50,
        dest_time: 2,
        dest_cost: 60,
    };
    let services = vec![((0, 1), service), ((0, 2), service)];

    Problem::new("UtilsProblem".to_string(), 2, vessels, cargoes, sailings, services)
        .expect("test problem is complete")
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(65)), "0h 01m 05s");
    assert_eq!(format_duration(Duration::from_secs(3600 + 120 + 5)), "1h 02m 05s");
    assert_eq!(
        format_duration(Duration::from_secs(7200 + 3600 + 900 + 30)),
        "3h 15m 30s"
    );
}

#[test]
fn test_save_solution() {
    let problem = create_test_problem();
    let solution = Solution::from_vec(&problem, vec![1, 1, 0, 2, 2]).unwrap();
    let path = std::env::temp_dir().join("pdp_anneal_utils_test.sol");

    save_solution(&solution, &problem, &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(content.contains("Solution for instance: UtilsProblem"));
    // vessel: 0 + 50 + 10 + 60, spot carrier: 800
    assert!(content.contains("Objective Value: 920"));
    assert!(content.contains("Is Feasible: true"));
    assert!(content.contains("Vessel #1: 1 -> 1"));
    assert!(content.contains("Spot carrier: 2 -> 2"));
}
