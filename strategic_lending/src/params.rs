use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::LenderPayoffs;

/// Economic and population parameters for one lending market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of borrowers (N)
    pub num_borrowers: usize,
    /// Share of low-cost borrowers (p_L)
    pub p_low_cost: f64,
    /// Creditworthiness cutoff: a borrower is good if z >= theta
    pub theta: f64,
    /// Borrower benefit from receiving a loan (b)
    pub benefit: f64,
    /// Harm to a good borrower who is denied (h)
    pub harm: f64,
    /// Adjustment-cost coefficient for the low-cost group (k_L)
    pub k_low: f64,
    /// Adjustment-cost coefficient for the high-cost group (k_H)
    pub k_high: f64,
    /// Lender profit per accepted good borrower (π_G)
    pub pi_good: f64,
    /// Lender profit per accepted bad borrower (π_B, usually negative)
    pub pi_bad: f64,
    /// Mean of true creditworthiness z
    pub z_mean: f64,
    /// Standard deviation of true creditworthiness z
    pub z_std: f64,
    /// Seed selecting the deterministic random stream
    pub seed: u64,
}

impl ModelConfig {
    /// Parameters of the regulation sweep experiment: fewer low-cost
    /// borrowers, mild denial harm and costly bad loans
    pub fn regulation_baseline() -> Self {
        ModelConfig {
            p_low_cost: 0.3,
            harm: 0.1,
            pi_bad: -0.6,
            ..Self::default()
        }
    }

    pub fn payoffs(&self) -> LenderPayoffs {
        LenderPayoffs {
            pi_good: self.pi_good,
            pi_bad: self.pi_bad,
        }
    }

    /// Check every field against the model's domain, failing on the first
    /// violation
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("theta", self.theta),
            ("benefit", self.benefit),
            ("harm", self.harm),
            ("pi_good", self.pi_good),
            ("pi_bad", self.pi_bad),
            ("z_mean", self.z_mean),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(Error::config(field, format!("must be finite, got {value}")));
            }
        }

        for (field, value) in [("k_low", self.k_low), ("k_high", self.k_high)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::config(
                    field,
                    format!("must be finite and > 0, got {value}"),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.p_low_cost) {
            return Err(Error::config(
                "p_low_cost",
                format!("must lie in [0, 1], got {}", self.p_low_cost),
            ));
        }

        if !(self.z_std.is_finite() && self.z_std >= 0.0) {
            return Err(Error::config(
                "z_std",
                format!("must be finite and >= 0, got {}", self.z_std),
            ));
        }

        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            num_borrowers: 10_000,
            p_low_cost: 0.5,
            theta: 0.0,
            benefit: 1.0,
            harm: 0.5,
            k_low: 0.1,
            k_high: 0.3,
            pi_good: 0.2,
            pi_bad: -0.2,
            z_mean: 0.0,
            z_std: 1.0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(config: &ModelConfig) -> &'static str {
        match config.validate() {
            Err(Error::Config { field, .. }) => field,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ModelConfig::default().validate().is_ok());
        assert!(ModelConfig::regulation_baseline().validate().is_ok());
    }

    #[test]
    fn regulation_baseline_overrides_only_three_fields() {
        let base = ModelConfig::default();
        let sweep = ModelConfig::regulation_baseline();
        assert_eq!(sweep.p_low_cost, 0.3);
        assert_eq!(sweep.harm, 0.1);
        assert_eq!(sweep.pi_bad, -0.6);
        assert_eq!(sweep.num_borrowers, base.num_borrowers);
        assert_eq!(sweep.k_high, base.k_high);
    }

    #[test]
    fn rejects_non_positive_cost_coefficients() {
        let config = ModelConfig {
            k_low: 0.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), "k_low");

        let config = ModelConfig {
            k_high: -1.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), "k_high");
    }

    #[test]
    fn rejects_share_outside_unit_interval() {
        for p in [-0.1, 1.1, f64::NAN] {
            let config = ModelConfig {
                p_low_cost: p,
                ..Default::default()
            };
            assert_eq!(rejected_field(&config), "p_low_cost");
        }
    }

    #[test]
    fn boundary_shares_are_accepted() {
        for p in [0.0, 1.0] {
            let config = ModelConfig {
                p_low_cost: p,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn rejects_negative_or_infinite_spread() {
        let config = ModelConfig {
            z_std: -0.5,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), "z_std");

        let config = ModelConfig {
            z_std: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), "z_std");
    }

    #[test]
    fn rejects_non_finite_payoffs() {
        let config = ModelConfig {
            pi_bad: f64::NEG_INFINITY,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), "pi_bad");
    }

    #[test]
    fn zero_spread_is_allowed() {
        let config = ModelConfig {
            z_std: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
