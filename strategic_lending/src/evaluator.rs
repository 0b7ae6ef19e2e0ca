//! Population-wide aggregates for one (threshold, penalty) pair

use serde::{Deserialize, Serialize};

use crate::population::Population;

/// Lender profit per accepted loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LenderPayoffs {
    pub pi_good: f64,
    pub pi_bad: f64,
}

/// Aggregate outcome of one threshold over a population
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThresholdStats {
    /// Total lender profit Π(t)
    pub profit: f64,
    /// Good-but-denied borrowers H(t)
    pub harm: usize,
    pub acc_low: f64,
    pub acc_high: f64,
    pub avg_cost_low: f64,
    pub avg_cost_high: f64,
}

impl ThresholdStats {
    /// Lender objective Π − λ·H
    pub fn objective(&self, lambda: f64) -> f64 {
        self.profit - lambda * self.harm as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub objective: f64,
    pub stats: ThresholdStats,
}

/// Running per-group tallies
#[derive(Debug, Clone, Copy, Default)]
struct GroupTally {
    members: usize,
    accepted: usize,
    total_cost: f64,
}

impl GroupTally {
    fn acceptance_rate(&self) -> f64 {
        if self.members == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.members as f64
    }

    fn average_cost(&self) -> f64 {
        if self.members == 0 {
            return 0.0;
        }
        self.total_cost / self.members as f64
    }
}

/// Aggregate profit, harm and group statistics at threshold `t` in a single
/// pass over the population
pub fn threshold_stats(
    population: &Population,
    payoffs: &LenderPayoffs,
    t: f64,
) -> ThresholdStats {
    let mut profit = 0.0;
    let mut harm = 0;
    let mut low = GroupTally::default();
    let mut high = GroupTally::default();

    for borrower in population {
        let a = borrower.best_response(t);
        let s = borrower.z + a;
        let accepted = s >= t;
        let is_good = borrower.is_good();

        if accepted {
            profit += if is_good {
                payoffs.pi_good
            } else {
                payoffs.pi_bad
            };
        } else if is_good {
            harm += 1;
        }

        let tally = if borrower.is_low_cost() {
            &mut low
        } else {
            &mut high
        };
        tally.members += 1;
        if accepted {
            tally.accepted += 1;
        }
        tally.total_cost += borrower.adjustment_cost(a);
    }

    ThresholdStats {
        profit,
        harm,
        acc_low: low.acceptance_rate(),
        acc_high: high.acceptance_rate(),
        avg_cost_low: low.average_cost(),
        avg_cost_high: high.average_cost(),
    }
}

/// Evaluate threshold `t` under penalty weight `lambda`
pub fn evaluate(
    population: &Population,
    payoffs: &LenderPayoffs,
    t: f64,
    lambda: f64,
) -> Evaluation {
    let stats = threshold_stats(population, payoffs, t);
    Evaluation {
        objective: stats.objective(lambda),
        stats,
    }
}
