//! Regime exploration
//!
//! Evaluates the unregulated lender (λ = 0) across a grid of economic
//! regimes and lists the ones that deny the largest share of creditworthy
//! borrowers.
//!
//! Usage:
//!   cargo run --release --bin explore_regimes
//!   cargo run --release --bin explore_regimes -- --config experiments/harm_search.toml --top-k 20

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use strategic_lending::experiment::ExperimentConfig;
use strategic_lending::output::{RegimeRecord, RunKind, RunMetadata, RunOutput};
use strategic_lending::{logging, Explorer, ParameterRegime, Result};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "explore_regimes")]
#[command(about = "Economic regimes ranked by harm to creditworthy borrowers")]
struct Args {
    /// Experiment file (TOML); the harm search when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output directory, overriding the experiment's
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Number of regimes to print and export, overriding the experiment's
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

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
        None => ExperimentConfig::exploration_default(),
    };
    let settings = experiment.explore_settings();
    let top_k = args.top_k.unwrap_or(settings.top_k);

    println!("=== Strategic Lending: Regime Exploration ===");
    println!("Experiment: {}", experiment.experiment.name);
    if !experiment.experiment.description.is_empty() {
        println!("{}", experiment.experiment.description);
    }
    println!(
        "Regimes: {}  Borrowers per regime: {}  Seed: {}\n",
        settings.grid.len(),
        experiment.model.num_borrowers,
        experiment.model.seed
    );

    let t_grid = experiment.exploration_threshold_grid();
    let mut explorer = Explorer::new(experiment.model.clone(), settings.grid, t_grid);
    if let Some(n) = args.threads {
        explorer = explorer.num_threads(n);
    }

    let start = Instant::now();
    let report = explorer.run()?;
    info!(
        ranked = report.regimes.len(),
        degenerate = report.degenerate.len(),
        failed = report.failed.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "exploration finished"
    );
    for (params, message) in &report.failed {
        warn!(?params, %message, "regime failed");
    }

    println!("Top {} regimes by share of good borrowers denied:\n", top_k);
    print_table(report.top(top_k));

    let records: Vec<RegimeRecord> = report.top(top_k).iter().map(RegimeRecord::from).collect();
    let output = RunOutput::new(
        RunMetadata::new(
            RunKind::RegimeExploration,
            &experiment.experiment.name,
            &experiment.model,
        ),
        records,
    );

    let out = &experiment.output;
    if out.csv || out.json {
        let dir = args
            .out
            .clone()
            .unwrap_or_else(|| out.directory.join(&experiment.experiment.name));
        output.write_all(&dir, "regimes", out.csv, out.json)?;
        println!("\nResults written to {}", dir.display());
    }

    Ok(())
}

fn print_table(regimes: &[ParameterRegime]) {
    println!(
        "{:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6} | {:>7} {:>9} {:>6} {:>8} {:>6} {:>6}",
        "p_L", "b", "h", "k_L", "k_H", "π_G", "π_B", "t*", "Π", "H", "H/N", "acc_L", "acc_H"
    );
    println!("{:-<104}", "");
    for r in regimes {
        let p = &r.params;
        let s = &r.stats;
        print!(
            "{:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>6.2} | ",
            p.p_low_cost, p.benefit, p.harm, p.k_low, p.k_high, p.pi_good, p.pi_bad
        );
        println!(
            "{:>7.3} {:>9.2} {:>6} {:>8.4} {:>6.3} {:>6.3}",
            r.t_star, s.profit, s.harm, r.h_frac, s.acc_low, s.acc_high
        );
    }
}
