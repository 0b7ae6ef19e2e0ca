//! Strategic behaviour of a single borrower
//!
//! A borrower observes the lender's threshold `t` on reported scores and
//! decides whether to inflate its true score `z` just enough to clear it.
//! Adjusting costs `k * a²`; being accepted is worth `b`; a creditworthy
//! borrower who is denied suffers harm `h`.

use serde::{Deserialize, Serialize};

/// Adjustment-cost group a borrower belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostGroup {
    LowCost,
    HighCost,
}

/// Borrower agent. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Borrower {
    /// True creditworthiness
    pub z: f64,
    /// Adjustment-cost coefficient
    pub k: f64,
    /// Creditworthiness cutoff shared by the population
    pub theta: f64,
    /// Benefit from receiving a loan
    pub b: f64,
    /// Harm if creditworthy and denied
    pub h: f64,
    pub group: CostGroup,
}

impl Borrower {
    pub fn is_low_cost(&self) -> bool {
        self.group == CostGroup::LowCost
    }

    /// Whether the borrower is creditworthy (good)
    pub fn is_good(&self) -> bool {
        self.z >= self.theta
    }

    /// Best-response adjustment given lender threshold `t`.
    ///
    /// Returns either 0 or exactly the gap `t - z`: a borrower never
    /// overshoots the threshold. When adjusting and not adjusting yield the
    /// same utility the borrower adjusts.
    pub fn best_response(&self, t: f64) -> f64 {
        if self.z >= t {
            return 0.0;
        }

        let delta = t - self.z;
        if delta <= 0.0 {
            return 0.0;
        }

        let u_adjust = self.b - self.k * delta * delta;
        let u_no = if self.is_good() { -self.h } else { 0.0 };

        if u_adjust >= u_no {
            delta
        } else {
            0.0
        }
    }

    /// Quadratic adjustment cost `k * a²`
    pub fn adjustment_cost(&self, a: f64) -> f64 {
        self.k * a * a
    }

    /// Score the lender observes under threshold `t`
    pub fn reported_score(&self, t: f64) -> f64 {
        self.z + self.best_response(t)
    }
}
