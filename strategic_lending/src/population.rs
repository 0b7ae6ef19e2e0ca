//! Seeded sampling of borrower populations

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::borrower::{Borrower, CostGroup};
use crate::error::Result;
use crate::params::ModelConfig;

/// Ordered collection of borrowers produced by one generation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    borrowers: Vec<Borrower>,
}

impl Population {
    pub fn from_borrowers(borrowers: Vec<Borrower>) -> Self {
        Population { borrowers }
    }

    /// Draw a population from `rng`.
    ///
    /// All `N` creditworthiness values are drawn first, then `N` uniforms
    /// assign cost groups, so the z values for a given seed do not depend on
    /// `p_low_cost`.
    pub fn sample<R: Rng + ?Sized>(config: &ModelConfig, rng: &mut R) -> Result<Self> {
        let n = config.num_borrowers;
        let normal = Normal::new(config.z_mean, config.z_std)?;

        let z_values: Vec<f64> = (0..n).map(|_| normal.sample(rng)).collect();
        let low_cost: Vec<bool> = (0..n)
            .map(|_| rng.random::<f64>() < config.p_low_cost)
            .collect();

        let borrowers = z_values
            .into_iter()
            .zip(low_cost)
            .map(|(z, is_low)| {
                let (group, k) = if is_low {
                    (CostGroup::LowCost, config.k_low)
                } else {
                    (CostGroup::HighCost, config.k_high)
                };
                Borrower {
                    z,
                    k,
                    theta: config.theta,
                    b: config.benefit,
                    h: config.harm,
                    group,
                }
            })
            .collect();

        Ok(Population { borrowers })
    }

    pub fn len(&self) -> usize {
        self.borrowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borrowers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Borrower> {
        self.borrowers.iter()
    }

    pub fn borrowers(&self) -> &[Borrower] {
        &self.borrowers
    }

    pub fn count_in(&self, group: CostGroup) -> usize {
        self.borrowers.iter().filter(|b| b.group == group).count()
    }

    /// Number of creditworthy borrowers
    pub fn count_good(&self) -> usize {
        self.borrowers.iter().filter(|b| b.is_good()).count()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Borrower;
    type IntoIter = std::slice::Iter<'a, Borrower>;

    fn into_iter(self) -> Self::IntoIter {
        self.borrowers.iter()
    }
}

/// Owns a configuration and the random stream populations are drawn from
pub struct PopulationGenerator {
    config: ModelConfig,
    rng: StdRng,
}

impl PopulationGenerator {
    pub fn new(config: ModelConfig, seed: u64) -> Self {
        PopulationGenerator {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample the next population from the current stream
    pub fn generate(&mut self) -> Result<Population> {
        Population::sample(&self.config, &mut self.rng)
    }

    /// Replace the population. A seed restarts the stream; `None` continues
    /// where the previous draw stopped.
    pub fn regenerate(&mut self, seed: Option<u64>) -> Result<Population> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.generate()
    }
}
