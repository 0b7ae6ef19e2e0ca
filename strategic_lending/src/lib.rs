//! Strategic Lending Under Regulation
//!
//! A lender picks an acceptance threshold on reported credit scores.
//! Borrowers see the threshold and may pay a quadratic cost to inflate their
//! true score `z` up to it. A regulator charges the lender λ per creditworthy
//! borrower who ends up denied, so the lender maximizes Π(t) − λ·H(t).
//!
//! Components:
//! - Borrower: best response to a known threshold
//! - Population: seeded draw of low- and high-cost borrowers
//! - Evaluator: profit, harm and per-group statistics at one threshold
//! - Sweep: best threshold for each penalty weight
//! - Explorer: unregulated optimum across a grid of economic regimes,
//!   ranked by the share of good borrowers denied
//!
//! Expected outcomes:
//! - Raising λ lowers the chosen threshold and never increases harm
//! - High-cost borrowers are accepted less often than low-cost ones

pub mod borrower;
pub mod error;
pub mod evaluator;
pub mod experiment;
pub mod explorer;
pub mod grid;
pub mod logging;
pub mod model;
pub mod output;
pub mod parallel;
pub mod params;
pub mod population;
pub mod sweep;

pub use borrower::{Borrower, CostGroup};
pub use error::{Error, Result};
pub use evaluator::{evaluate, threshold_stats, Evaluation, LenderPayoffs, ThresholdStats};
pub use experiment::ExperimentConfig;
pub use explorer::{
    evaluate_regime, explore, rank_by_harm, top_k, ExplorationReport, Explorer, ParameterGrid,
    ParameterRegime, RegimeParams,
};
pub use grid::{linspace, GridSpec};
pub use model::LendingModel;
pub use params::ModelConfig;
pub use population::{Population, PopulationGenerator};
pub use sweep::{
    sweep_lambda, unregulated_optimum, SweepResult, ThresholdOptimum, ThresholdProfile,
};
