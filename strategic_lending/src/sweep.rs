//! Exhaustive threshold search under a grid of penalty weights
//!
//! Π(t) and H(t) do not depend on λ, so every threshold is evaluated once
//! into a [`ThresholdProfile`] and each penalty weight rescans that profile.
//! The selected thresholds are the same as evaluating every (λ, t) cell
//! from scratch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::evaluator::{threshold_stats, LenderPayoffs, ThresholdStats};
use crate::population::Population;

/// Best threshold found by one scan of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptimum {
    pub t_star: f64,
    pub objective: f64,
    pub stats: ThresholdStats,
    /// Grid cells skipped because their objective was not finite
    pub excluded: usize,
}

/// Outcome of the threshold search for one penalty weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub lambda: f64,
    /// `None` when no threshold produced a finite objective
    pub optimum: Option<ThresholdOptimum>,
}

impl SweepResult {
    pub fn is_degenerate(&self) -> bool {
        self.optimum.is_none()
    }
}

/// Statistics for every threshold of a grid, in grid order
#[derive(Debug, Clone)]
pub struct ThresholdProfile {
    cells: Vec<(f64, ThresholdStats)>,
}

impl ThresholdProfile {
    /// Evaluate every threshold in parallel; order follows `t_grid`
    pub fn compute(population: &Population, payoffs: &LenderPayoffs, t_grid: &[f64]) -> Self {
        let cells = t_grid
            .par_iter()
            .map(|&t| (t, threshold_stats(population, payoffs, t)))
            .collect();
        ThresholdProfile { cells }
    }

    /// Scan thresholds in grid order keeping the first strict maximum of
    /// Π − λ·H. Non-finite objectives never win.
    pub fn best(&self, lambda: f64) -> Option<ThresholdOptimum> {
        let mut best: Option<ThresholdOptimum> = None;
        let mut excluded = 0;

        for &(t, stats) in &self.cells {
            let objective = stats.objective(lambda);
            if !objective.is_finite() {
                excluded += 1;
                continue;
            }
            let improves = match best {
                Some(ref current) => objective > current.objective,
                None => true,
            };
            if improves {
                best = Some(ThresholdOptimum {
                    t_star: t,
                    objective,
                    stats,
                    excluded: 0,
                });
            }
        }

        match best {
            Some(mut optimum) => {
                optimum.excluded = excluded;
                Some(optimum)
            }
            None => {
                warn!(
                    lambda,
                    cells = self.cells.len(),
                    "no threshold produced a finite objective"
                );
                None
            }
        }
    }
}

/// Profit-maximizing threshold for each penalty weight, in `lambda_grid`
/// order
pub fn sweep_lambda(
    population: &Population,
    payoffs: &LenderPayoffs,
    lambda_grid: &[f64],
    t_grid: &[f64],
) -> Vec<SweepResult> {
    let profile = ThresholdProfile::compute(population, payoffs, t_grid);

    lambda_grid
        .iter()
        .map(|&lambda| {
            let optimum = profile.best(lambda);
            if let Some(ref opt) = optimum {
                debug!(lambda, t_star = opt.t_star, harm = opt.stats.harm, "sweep point");
            }
            SweepResult { lambda, optimum }
        })
        .collect()
}

/// Profit-maximizing threshold without regulation (λ = 0)
pub fn unregulated_optimum(
    population: &Population,
    payoffs: &LenderPayoffs,
    t_grid: &[f64],
) -> Option<ThresholdOptimum> {
    ThresholdProfile::compute(population, payoffs, t_grid).best(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrower::{Borrower, CostGroup};
    use crate::evaluator::evaluate;
    use crate::params::ModelConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_population(n: usize, seed: u64) -> (Population, LenderPayoffs) {
        let config = ModelConfig {
            num_borrowers: n,
            ..ModelConfig::regulation_baseline()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        (
            Population::sample(&config, &mut rng).unwrap(),
            config.payoffs(),
        )
    }

    /// Direct transcription of the nested (λ, t) search
    fn naive_sweep(
        population: &Population,
        payoffs: &LenderPayoffs,
        lambda_grid: &[f64],
        t_grid: &[f64],
    ) -> Vec<(f64, f64, ThresholdStats)> {
        lambda_grid
            .iter()
            .map(|&lambda| {
                let mut best_obj = f64::NEG_INFINITY;
                let mut best = None;
                for &t in t_grid {
                    let eval = evaluate(population, payoffs, t, lambda);
                    if eval.objective > best_obj {
                        best_obj = eval.objective;
                        best = Some((t, eval.stats));
                    }
                }
                let (t, stats) = best.unwrap();
                (lambda, t, stats)
            })
            .collect()
    }

    #[test]
    fn matches_naive_nested_search() {
        let (population, payoffs) = sample_population(800, 4);
        let t_grid = crate::grid::linspace(-1.5, 3.0, 46);
        let lambda_grid = crate::grid::linspace(0.0, 2.0, 11);

        let fast = sweep_lambda(&population, &payoffs, &lambda_grid, &t_grid);
        let naive = naive_sweep(&population, &payoffs, &lambda_grid, &t_grid);

        assert_eq!(fast.len(), naive.len());
        for (result, (lambda, t, stats)) in fast.iter().zip(naive) {
            let opt = result.optimum.unwrap();
            assert_eq!(result.lambda, lambda);
            assert_eq!(opt.t_star, t);
            assert_eq!(opt.stats, stats);
        }
    }

    #[test]
    fn results_follow_lambda_grid_order() {
        let (population, payoffs) = sample_population(200, 1);
        let lambda_grid = [1.0, 0.0, 0.5];
        let results = sweep_lambda(&population, &payoffs, &lambda_grid, &[0.0, 0.5, 1.0]);
        let lambdas: Vec<f64> = results.iter().map(|r| r.lambda).collect();
        assert_eq!(lambdas, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn zero_penalty_maximizes_raw_profit() {
        let (population, payoffs) = sample_population(1_000, 8);
        let t_grid = crate::grid::linspace(-1.5, 4.0, 56);

        let results = sweep_lambda(&population, &payoffs, &[0.0], &t_grid);
        let opt = results[0].optimum.unwrap();

        let max_profit = t_grid
            .iter()
            .map(|&t| threshold_stats(&population, &payoffs, t).profit)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(opt.stats.profit, max_profit);
        assert_eq!(opt.objective, opt.stats.profit);
    }

    #[test]
    fn ties_keep_the_earliest_threshold() {
        // A single good borrower far above every threshold: every cell has
        // the same objective.
        let population = Population::from_borrowers(vec![Borrower {
            z: 10.0,
            k: 0.1,
            theta: 0.0,
            b: 1.0,
            h: 0.5,
            group: CostGroup::HighCost,
        }]);
        let payoffs = LenderPayoffs {
            pi_good: 0.2,
            pi_bad: -0.2,
        };
        let opt = unregulated_optimum(&population, &payoffs, &[0.5, -1.0, 2.0]).unwrap();
        assert_eq!(opt.t_star, 0.5);
    }

    #[test]
    fn non_finite_objectives_are_excluded() {
        let population = Population::from_borrowers(vec![Borrower {
            z: 1.0,
            k: 0.1,
            theta: 0.0,
            b: 1.0,
            h: 0.5,
            group: CostGroup::LowCost,
        }]);
        let payoffs = LenderPayoffs {
            pi_good: f64::INFINITY,
            pi_bad: -0.2,
        };

        // Thresholds at or below z accept a good borrower worth +inf; the
        // threshold above it denies the borrower and stays finite.
        let opt = unregulated_optimum(&population, &payoffs, &[0.0, 0.5, 5.0]).unwrap();
        assert_eq!(opt.t_star, 5.0);
        assert_eq!(opt.excluded, 2);
    }

    #[test]
    fn all_non_finite_is_degenerate() {
        let population = Population::from_borrowers(vec![Borrower {
            z: 1.0,
            k: 0.1,
            theta: 0.0,
            b: 1.0,
            h: 0.5,
            group: CostGroup::LowCost,
        }]);
        let payoffs = LenderPayoffs {
            pi_good: f64::NAN,
            pi_bad: 0.0,
        };
        let results = sweep_lambda(&population, &payoffs, &[0.0, 1.0], &[0.0, 0.5]);
        assert!(results.iter().all(SweepResult::is_degenerate));
    }

    #[test]
    fn empty_threshold_grid_is_degenerate() {
        let (population, payoffs) = sample_population(10, 0);
        assert!(unregulated_optimum(&population, &payoffs, &[]).is_none());
    }

    #[test]
    fn higher_penalty_never_increases_harm() {
        let (population, payoffs) = sample_population(2_000, 3);
        let t_grid = crate::grid::default_threshold_grid().values();
        let lambda_grid = crate::grid::default_lambda_grid().values();

        let results = sweep_lambda(&population, &payoffs, &lambda_grid, &t_grid);
        let harms: Vec<usize> = results.iter().map(|r| r.optimum.unwrap().stats.harm).collect();
        assert!(harms.windows(2).all(|w| w[1] <= w[0]), "harms: {:?}", harms);
    }
}
