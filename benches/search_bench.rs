//! Benchmarks for solution evaluation and the adaptive search.

#[cfg(feature = "bench")]
extern crate criterion;

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pdp_anneal::config::Config;
use pdp_anneal::problem::{Cargo, PortService, Problem, Sailing, Vessel};
use pdp_anneal::solution::Solution;
use pdp_anneal::Solver;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Create a benchmark problem with the given number of cargoes and a vessel
/// for every five cargoes.
fn create_benchmark_problem(nr_of_cargo: usize) -> Problem {
    let nr_of_ports = 20;
    let nr_of_vessels = (nr_of_cargo / 5).max(1);

    let vessels = (0..nr_of_vessels)
        .map(|v| {
            Vessel::new(
                v % nr_of_ports,
                (v % 4) as i64 * 5,
                30,
                (1..=nr_of_cargo).collect(),
            )
        })
        .collect::<Vec<_>>();

    let cargoes = (0..nr_of_cargo)
        .map(|i| {
            let origin = i % nr_of_ports;
            let dest = (i * 7 + 3) % nr_of_ports;
            let dest = if dest == origin { (dest + 1) % nr_of_ports } else { dest };
            let lower = (i % 10) as i64 * 20;
            Cargo::new(
                origin,
                dest,
                5 + (i % 6) as i64,
                10_000 + 10 * i as i64,
                lower,
                lower + 200,
                lower,
                lower + 400,
            )
        })
        .collect::<Vec<_>>();

    let sailings = (0..nr_of_vessels).flat_map(move |v| {
        (0..nr_of_ports).flat_map(move |from| {
            (0..nr_of_ports).map(move |to| {
                let distance = from.abs_diff(to) as i64;
                (
                    (v, from, to),
                    Sailing {
                        time: 2 * distance,
                        cost: (40 + v as i64) * distance,
                    },
                )
            })
        })
    });

    let services = (0..nr_of_vessels).flat_map(move |v| {
        (1..=nr_of_cargo).map(move |id| {
            (
                (v, id),
                PortService {
                    origin_time: 2,
                    origin_cost: 100,
                    dest_time: 2,
                    dest_cost: 100,
                },
            )
        })
    });

    Problem::new(
        format!("BenchProblem_{}", nr_of_cargo),
        nr_of_ports,
        vessels,
        cargoes,
        sailings,
        services,
    )
    .expect("benchmark problem is complete")
}

#[cfg(feature = "bench")]
fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for size in [20, 80, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let mut solution = Solution::random(&problem, &mut rng);

            b.iter(|| {
                let feasible = solution.is_feasible(&problem, true, false);
                let value = solution.objective_value(&problem, false);
                (feasible, value)
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_search");
    group.sample_size(10);

    for size in [20, 80].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new().with_iterations(5_000).with_seed(42);

            b.iter(|| {
                let mut solver = Solver::new(problem.clone(), config.clone());
                solver.run();
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(benches, benchmark_evaluation, benchmark_search);

#[cfg(feature = "bench")]
criterion_main!(benches);
