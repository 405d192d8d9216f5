use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use pdp_anneal::config::{AlgorithmKind, Config};
use pdp_anneal::problem::Problem;
use pdp_anneal::utils::save_solution;
use pdp_anneal::Solver;
use std::path::PathBuf;

/// Solve a pickup and delivery problem with vessels.
#[derive(Debug, Parser)]
#[command(name = "pdp-anneal", version, about)]
struct Args {
    /// Path to the instance file
    #[arg(short, long)]
    file: PathBuf,

    /// Number of search iterations
    #[arg(short, long, default_value_t = 10_000)]
    iterations: usize,

    /// Seed of the random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Search algorithm to run
    #[arg(short, long, value_enum, default_value_t = AlgorithmKind::Adaptive)]
    algorithm: AlgorithmKind,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write a per-vessel listing of the best solution to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase logging verbosity, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let problem = Problem::from_file(&args.file)?;
    info!(
        "Loaded {} with {} vessels and {} cargoes",
        problem.name,
        problem.nr_of_vessels(),
        problem.nr_of_cargo()
    );

    let mut config = Config::new()
        .with_algorithm(args.algorithm)
        .with_iterations(args.iterations);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut solver = Solver::new(problem, config);
    solver.run();
    let report = solver
        .report()
        .context("Search finished without a solution")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.format());
        if let Some(best) = &solver.best_solution {
            println!("Best solution: {}", best);
        }
    }

    if let Some(path) = &args.output {
        let best = solver
            .best_solution
            .as_ref()
            .context("Search finished without a solution")?;
        save_solution(best, &solver.problem, path)
            .with_context(|| format!("Failed to write solution to {}", path.display()))?;
        info!("Saved solution to {}", path.display());
    }

    Ok(())
}
