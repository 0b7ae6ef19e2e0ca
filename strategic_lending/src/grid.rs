//! Search grids for thresholds and penalty weights

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// `points` evenly spaced values from `start` to `stop`, both inclusive.
///
/// ```
/// use strategic_lending::grid::linspace;
///
/// assert_eq!(linspace(0.0, 2.0, 5), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
/// assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
/// assert!(linspace(0.0, 1.0, 0).is_empty());
/// ```
pub fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            let mut values: Vec<f64> = (0..points).map(|i| start + i as f64 * step).collect();
            values[points - 1] = stop;
            values
        }
    }
}

/// Serializable description of a linear grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub start: f64,
    pub stop: f64,
    pub points: usize,
}

impl GridSpec {
    pub fn new(start: f64, stop: f64, points: usize) -> Self {
        GridSpec {
            start,
            stop,
            points,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.points)
    }
}

/// Threshold grid of the regulation sweep
pub fn default_threshold_grid() -> GridSpec {
    GridSpec::new(-1.5, 4.0, 261)
}

/// Penalty grid of the regulation sweep
pub fn default_lambda_grid() -> GridSpec {
    GridSpec::new(0.0, 2.0, 21)
}

/// Threshold grid used for each regime of the parameter exploration
pub fn exploration_threshold_grid() -> GridSpec {
    GridSpec::new(-1.5, 4.0, 281)
}

/// Reject empty grids and non-finite entries.
///
/// Ordering is left to the caller: iteration order decides tie-breaks, so a
/// grid that is not ascending is only reported.
pub fn validate_grid(name: &'static str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::config(name, "grid is empty"));
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(Error::config(name, format!("entry {i} is not finite ({v})")));
    }
    if values.windows(2).any(|w| w[1] < w[0]) {
        warn!(grid = name, "grid is not ascending; ties resolve in the given order");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_hits_both_ends() {
        let grid = linspace(-1.5, 4.0, 261);
        assert_eq!(grid.len(), 261);
        assert_eq!(grid[0], -1.5);
        assert_eq!(grid[260], 4.0);
        assert_relative_eq!(grid[1] - grid[0], 5.5 / 260.0, epsilon = 1e-12);
    }

    #[test]
    fn default_lambda_grid_steps_by_tenths() {
        let grid = default_lambda_grid().values();
        assert_eq!(grid.len(), 21);
        assert_eq!(grid[0], 0.0);
        assert_relative_eq!(grid[10], 1.0, epsilon = 1e-12);
        assert_eq!(grid[20], 2.0);
    }

    #[test]
    fn linspace_is_ascending() {
        let grid = exploration_threshold_grid().values();
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn validate_rejects_empty_and_non_finite() {
        assert!(matches!(
            validate_grid("t_grid", &[]),
            Err(Error::Config { field: "t_grid", .. })
        ));
        assert!(validate_grid("t_grid", &[0.0, f64::NAN]).is_err());
        assert!(validate_grid("lambda_grid", &[f64::INFINITY]).is_err());
    }

    #[test]
    fn validate_accepts_unordered_grid() {
        assert!(validate_grid("t_grid", &[1.0, 0.0, 2.0]).is_ok());
        assert!(validate_grid("lambda_grid", &[-1.0, 0.0]).is_ok());
    }
}
