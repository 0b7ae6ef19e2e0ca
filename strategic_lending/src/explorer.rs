//! Search over economic regimes for the ones that most harm creditworthy
//! borrowers when the lender is unregulated.
//!
//! Every regime shares the base configuration's population size,
//! creditworthiness distribution, cutoff and seed, so differences between
//! regimes come from the economics alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::evaluator::ThresholdStats;
use crate::grid::validate_grid;
use crate::parallel::{logging_progress_reporter, ParallelRunner};
use crate::params::ModelConfig;
use crate::population::Population;
use crate::sweep::unregulated_optimum;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The seven economic parameters varied across regimes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeParams {
    pub p_low_cost: f64,
    pub benefit: f64,
    pub harm: f64,
    pub k_low: f64,
    pub k_high: f64,
    pub pi_good: f64,
    pub pi_bad: f64,
}

impl RegimeParams {
    /// `base` with this regime's economics substituted in
    pub fn apply(&self, base: &ModelConfig) -> ModelConfig {
        ModelConfig {
            p_low_cost: self.p_low_cost,
            benefit: self.benefit,
            harm: self.harm,
            k_low: self.k_low,
            k_high: self.k_high,
            pi_good: self.pi_good,
            pi_bad: self.pi_bad,
            ..base.clone()
        }
    }
}

/// Value lists for each economic parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub p_low_cost: Vec<f64>,
    pub benefit: Vec<f64>,
    pub harm: Vec<f64>,
    pub k_low: Vec<f64>,
    pub k_high: Vec<f64>,
    pub pi_good: Vec<f64>,
    pub pi_bad: Vec<f64>,
}

impl ParameterGrid {
    /// 324 regimes around the default market, searching for high harm
    pub fn harm_search() -> Self {
        ParameterGrid {
            p_low_cost: vec![0.3, 0.5],
            benefit: vec![0.8, 1.0],
            harm: vec![0.1, 0.3, 0.5],
            k_low: vec![0.1],
            k_high: vec![0.3, 0.7, 1.0],
            pi_good: vec![0.2],
            pi_bad: vec![-0.2, -0.4, -0.6],
        }
    }

    fn axes(&self) -> [&[f64]; 7] {
        [
            &self.p_low_cost,
            &self.benefit,
            &self.harm,
            &self.k_low,
            &self.k_high,
            &self.pi_good,
            &self.pi_bad,
        ]
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.axes().iter().map(|axis| axis.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily enumerate the Cartesian product, `p_low_cost` varying slowest
    /// and `pi_bad` fastest
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations {
            grid: self,
            indices: [0; 7],
            done: self.is_empty(),
        }
    }
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self::harm_search()
    }
}

/// Iterator over every [`RegimeParams`] of a [`ParameterGrid`]
pub struct Combinations<'a> {
    grid: &'a ParameterGrid,
    indices: [usize; 7],
    done: bool,
}

impl Iterator for Combinations<'_> {
    type Item = RegimeParams;

    fn next(&mut self) -> Option<RegimeParams> {
        if self.done {
            return None;
        }

        let axes = self.grid.axes();
        let i = self.indices;
        let item = RegimeParams {
            p_low_cost: axes[0][i[0]],
            benefit: axes[1][i[1]],
            harm: axes[2][i[2]],
            k_low: axes[3][i[3]],
            k_high: axes[4][i[4]],
            pi_good: axes[5][i[5]],
            pi_bad: axes[6][i[6]],
        };

        // Odometer increment from the innermost axis
        let mut axis = axes.len();
        loop {
            if axis == 0 {
                self.done = true;
                break;
            }
            axis -= 1;
            self.indices[axis] += 1;
            if self.indices[axis] < axes[axis].len() {
                break;
            }
            self.indices[axis] = 0;
        }

        Some(item)
    }
}

/// One regime with its unregulated optimum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRegime {
    pub params: RegimeParams,
    pub t_star: f64,
    pub stats: ThresholdStats,
    /// Share of the population that is good but denied, H / N
    pub h_frac: f64,
}

/// Ranked regimes and the combinations that could not be ranked
#[derive(Debug, Clone, Default)]
pub struct ExplorationReport {
    /// Sorted by `h_frac` descending; ties keep enumeration order
    pub regimes: Vec<ParameterRegime>,
    /// Combinations where no threshold gave a finite objective
    pub degenerate: Vec<RegimeParams>,
    /// Combinations whose evaluation panicked, with the panic message
    pub failed: Vec<(RegimeParams, String)>,
}

impl ExplorationReport {
    /// The `k` most harmful regimes
    pub fn top(&self, k: usize) -> &[ParameterRegime] {
        &self.regimes[..k.min(self.regimes.len())]
    }
}

/// Stable sort by harm fraction, most harmful first
pub fn rank_by_harm(regimes: &mut [ParameterRegime]) {
    regimes.sort_by(|a, b| b.h_frac.total_cmp(&a.h_frac));
}

/// Keep the first `k` regimes
pub fn top_k(mut regimes: Vec<ParameterRegime>, k: usize) -> Vec<ParameterRegime> {
    regimes.truncate(k);
    regimes
}

/// Build the regime's population from the shared seed and find its
/// unregulated optimum. `Ok(None)` marks a degenerate search.
pub fn evaluate_regime(
    base: &ModelConfig,
    params: &RegimeParams,
    t_grid: &[f64],
) -> Result<Option<ParameterRegime>> {
    let config = params.apply(base);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let population = Population::sample(&config, &mut rng)?;

    let regime = unregulated_optimum(&population, &config.payoffs(), t_grid).map(|optimum| {
        let h_frac = if population.is_empty() {
            0.0
        } else {
            optimum.stats.harm as f64 / population.len() as f64
        };
        ParameterRegime {
            params: *params,
            t_star: optimum.t_star,
            stats: optimum.stats,
            h_frac,
        }
    });

    if let Some(ref r) = regime {
        debug!(?params, t_star = r.t_star, h_frac = r.h_frac, "regime evaluated");
    }
    Ok(regime)
}

/// Parallel exploration of a parameter grid
pub struct Explorer {
    base: ModelConfig,
    grid: ParameterGrid,
    t_grid: Vec<f64>,
    num_threads: Option<usize>,
}

impl Explorer {
    pub fn new(base: ModelConfig, grid: ParameterGrid, t_grid: Vec<f64>) -> Self {
        Explorer {
            base,
            grid,
            t_grid,
            num_threads: None,
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Validate every combination, evaluate them all, then rank by harm
    pub fn run(&self) -> Result<ExplorationReport> {
        validate_grid("t_grid", &self.t_grid)?;
        if self.grid.is_empty() {
            return Err(Error::config("parameter_grid", "an axis has no values"));
        }

        let combos: Vec<RegimeParams> = self.grid.combinations().collect();
        for params in &combos {
            params.apply(&self.base).validate()?;
        }

        info!(
            regimes = combos.len(),
            thresholds = self.t_grid.len(),
            borrowers = self.base.num_borrowers,
            "exploring parameter space"
        );

        let mut runner = ParallelRunner::new(combos.len(), |index| {
            evaluate_regime(&self.base, &combos[index], &self.t_grid)
        })
        .progress(logging_progress_reporter((combos.len() / 10).max(1)));
        if let Some(n) = self.num_threads {
            runner = runner.num_threads(n);
        }

        let mut report = ExplorationReport::default();
        for (params, outcome) in combos.iter().zip(runner.run()) {
            match outcome {
                Ok(Ok(Some(regime))) => report.regimes.push(regime),
                Ok(Ok(None)) => {
                    warn!(?params, "degenerate regime, excluded from ranking");
                    report.degenerate.push(*params);
                }
                Ok(Err(e)) => return Err(e),
                Err(panic) => {
                    warn!(?params, %panic, "regime evaluation panicked");
                    report.failed.push((*params, panic));
                }
            }
        }

        rank_by_harm(&mut report.regimes);
        Ok(report)
    }
}

/// Explore `grid` around `base` on rayon's global pool
pub fn explore(
    base: &ModelConfig,
    grid: &ParameterGrid,
    t_grid: &[f64],
) -> Result<ExplorationReport> {
    Explorer::new(base.clone(), grid.clone(), t_grid.to_vec()).run()
}
