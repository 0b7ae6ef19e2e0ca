//! Regulation sweep
//!
//! Finds the lender's profit-maximizing threshold for each penalty weight λ
//! and reports profit, harm and per-group outcomes at that threshold.
//!
//! Usage:
//!   cargo run --release --bin regulation_sweep
//!   cargo run --release --bin regulation_sweep -- --config experiments/regulation_baseline.toml

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use strategic_lending::experiment::ExperimentConfig;
use strategic_lending::output::{RunKind, RunMetadata, RunOutput, SweepRecord};
use strategic_lending::{logging, LendingModel, Result, SweepResult};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "regulation_sweep")]
#[command(about = "Optimal lending threshold as the regulatory penalty rises")]
struct Args {
    /// Experiment file (TOML); the baseline sweep when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output directory, overriding the experiment's
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let experiment = match &args.config {
        Some(path) => ExperimentConfig::from_path(path)?,
        None => ExperimentConfig::regulation_default(),
    };

    if let Some(n) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            tracing::warn!(error = %e, "could not size global thread pool");
        }
    }

    println!("=== Strategic Lending: Regulation Sweep ===");
    println!("Experiment: {}", experiment.experiment.name);
    if !experiment.experiment.description.is_empty() {
        println!("{}", experiment.experiment.description);
    }
    println!();

    let config = &experiment.model;
    println!("Configuration:");
    println!("  Borrowers (N): {}", config.num_borrowers);
    println!("  Low-cost share (p_L): {}", config.p_low_cost);
    println!("  Benefit (b): {}  Harm (h): {}", config.benefit, config.harm);
    println!("  Adjustment cost (k_L, k_H): ({}, {})", config.k_low, config.k_high);
    println!("  Payoffs (π_G, π_B): ({}, {})", config.pi_good, config.pi_bad);
    println!("  Seed: {}\n", config.seed);

    let t_grid = experiment.threshold_grid();
    let lambda_grid = experiment.lambda_grid();

    let start = Instant::now();
    let model = LendingModel::new(config.clone())?;
    let results = model.sweep_lambda(&lambda_grid, &t_grid)?;
    info!(
        lambdas = lambda_grid.len(),
        thresholds = t_grid.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "sweep finished"
    );

    print_table(&results);

    let records: Vec<SweepRecord> = results.iter().map(SweepRecord::from).collect();
    let output = RunOutput::new(
        RunMetadata::new(RunKind::RegulationSweep, &experiment.experiment.name, config),
        records,
    );

    let settings = &experiment.output;
    if settings.csv || settings.json {
        let dir = args
            .out
            .clone()
            .unwrap_or_else(|| settings.directory.join(&experiment.experiment.name));
        output.write_all(&dir, "sweep", settings.csv, settings.json)?;
        println!("\nResults written to {}", dir.display());
    }

    Ok(())
}

fn print_table(results: &[SweepResult]) {
    println!(
        "{:>6} {:>8} {:>10} {:>7} {:>7} {:>7} {:>8} {:>8}",
        "λ", "t*", "Π", "H", "acc_L", "acc_H", "cost_L", "cost_H"
    );
    println!(
        "{:->6} {:->8} {:->10} {:->7} {:->7} {:->7} {:->8} {:->8}",
        "", "", "", "", "", "", "", ""
    );
    for result in results {
        match &result.optimum {
            Some(opt) => {
                let s = &opt.stats;
                println!(
                    "{:>6.2} {:>8.3} {:>10.2} {:>7} {:>7.3} {:>7.3} {:>8.4} {:>8.4}",
                    result.lambda,
                    opt.t_star,
                    s.profit,
                    s.harm,
                    s.acc_low,
                    s.acc_high,
                    s.avg_cost_low,
                    s.avg_cost_high
                );
            }
            None => println!("{:>6.2} {:>8}", result.lambda, "n/a"),
        }
    }
}
