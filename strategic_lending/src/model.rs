use tracing::info;

use crate::error::Result;
use crate::evaluator::{evaluate, Evaluation, LenderPayoffs};
use crate::grid::validate_grid;
use crate::params::ModelConfig;
use crate::population::{Population, PopulationGenerator};
use crate::sweep::{self, SweepResult, ThresholdOptimum};

/// A lending market: a validated configuration, its random stream and the
/// borrower population currently drawn from it
pub struct LendingModel {
    config: ModelConfig,
    generator: PopulationGenerator,
    population: Population,
}

impl LendingModel {
    /// Validate `config` and draw the initial population from `config.seed`
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        let mut generator = PopulationGenerator::new(config.clone(), config.seed);
        let population = generator.generate()?;
        info!(
            borrowers = population.len(),
            good = population.count_good(),
            seed = config.seed,
            "population generated"
        );
        Ok(LendingModel {
            config,
            generator,
            population,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn payoffs(&self) -> LenderPayoffs {
        self.config.payoffs()
    }

    /// Resample the population. `Some(seed)` restarts the random stream,
    /// `None` continues it.
    pub fn reset_population(&mut self, seed: Option<u64>) -> Result<()> {
        self.population = self.generator.regenerate(seed)?;
        Ok(())
    }

    pub fn evaluate_threshold(&self, t: f64, lambda: f64) -> Evaluation {
        evaluate(&self.population, &self.payoffs(), t, lambda)
    }

    /// Best threshold for each penalty weight. Both grids must be non-empty
    /// and finite.
    pub fn sweep_lambda(&self, lambda_grid: &[f64], t_grid: &[f64]) -> Result<Vec<SweepResult>> {
        validate_grid("lambda_grid", lambda_grid)?;
        validate_grid("t_grid", t_grid)?;
        Ok(sweep::sweep_lambda(
            &self.population,
            &self.payoffs(),
            lambda_grid,
            t_grid,
        ))
    }

    pub fn unregulated_optimum(&self, t_grid: &[f64]) -> Result<Option<ThresholdOptimum>> {
        validate_grid("t_grid", t_grid)?;
        Ok(sweep::unregulated_optimum(
            &self.population,
            &self.payoffs(),
            t_grid,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn small_model(seed: u64) -> LendingModel {
        LendingModel::new(ModelConfig {
            num_borrowers: 300,
            seed,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn invalid_config_fails_fast() {
        let result = LendingModel::new(ModelConfig {
            k_high: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Config { field: "k_high", .. })));
    }

    #[test]
    fn population_comes_from_config_seed() {
        let a = small_model(21);
        let b = small_model(21);
        assert_eq!(a.population(), b.population());
        assert_ne!(a.population(), small_model(22).population());
    }

    #[test]
    fn reset_with_seed_restores_population() {
        let mut model = small_model(5);
        let original = model.population().clone();

        model.reset_population(None).unwrap();
        assert_ne!(model.population(), &original);

        model.reset_population(Some(5)).unwrap();
        assert_eq!(model.population(), &original);
    }

    #[test]
    fn empty_grids_are_rejected() {
        let model = small_model(0);
        assert!(model.sweep_lambda(&[], &[0.0]).is_err());
        assert!(model.sweep_lambda(&[0.0], &[]).is_err());
        assert!(model.unregulated_optimum(&[]).is_err());
    }

    #[test]
    fn unregulated_optimum_matches_zero_penalty_sweep() {
        let model = small_model(13);
        let t_grid = crate::grid::linspace(-1.0, 2.0, 31);
        let direct = model.unregulated_optimum(&t_grid).unwrap();
        let swept = model.sweep_lambda(&[0.0], &t_grid).unwrap()[0].optimum;
        assert_eq!(direct, swept);
    }

    #[test]
    fn evaluate_threshold_uses_config_payoffs() {
        let model = small_model(2);
        // A threshold below every score accepts everyone
        let eval = model.evaluate_threshold(-100.0, 1.0);
        let good = model.population().count_good() as f64;
        let bad = model.population().len() as f64 - good;
        let expected = 0.2 * good - 0.2 * bad;
        assert!((eval.stats.profit - expected).abs() < 1e-9);
        assert_eq!(eval.stats.harm, 0);
    }
}
