//! TOML experiment definitions
//!
//! ```toml
//! [experiment]
//! name = "regulation_baseline"
//! description = "Optimal threshold as the penalty weight rises"
//!
//! [model]
//! p_low_cost = 0.3
//! harm = 0.1
//! pi_bad = -0.6
//!
//! [thresholds]
//! start = -1.5
//! stop = 4.0
//! points = 261
//!
//! [lambdas]
//! start = 0.0
//! stop = 2.0
//! points = 21
//!
//! [explore]
//! top_k = 15
//!
//! [explore.grid]
//! pi_bad = [-0.2, -0.4, -0.6]
//!
//! [output]
//! directory = "results"
//! ```
//!
//! Missing `[model]` fields take the default market's values, missing
//! exploration axes take the harm-search grid's values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::explorer::ParameterGrid;
use crate::grid::{
    default_lambda_grid, default_threshold_grid, exploration_threshold_grid, GridSpec,
};
use crate::params::ModelConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentMetadata,
    #[serde(default)]
    pub model: ModelConfig,
    pub thresholds: Option<GridSpec>,
    pub lambdas: Option<GridSpec>,
    pub explore: Option<ExploreSettings>,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreSettings {
    #[serde(default)]
    pub grid: ParameterGrid,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        ExploreSettings {
            grid: ParameterGrid::default(),
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_true")]
    pub csv: bool,
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            directory: default_output_dir(),
            csv: true,
            json: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

impl ExperimentConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ExperimentConfig = toml::from_str(text)?;
        config.model.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The regulation sweep over the baseline market
    pub fn regulation_default() -> Self {
        ExperimentConfig {
            experiment: ExperimentMetadata {
                name: "regulation_baseline".to_string(),
                description: "Profit-maximizing threshold as the penalty weight rises".to_string(),
            },
            model: ModelConfig::regulation_baseline(),
            thresholds: Some(default_threshold_grid()),
            lambdas: Some(default_lambda_grid()),
            explore: None,
            output: OutputSettings::default(),
        }
    }

    /// The unregulated harm search over the default market
    pub fn exploration_default() -> Self {
        ExperimentConfig {
            experiment: ExperimentMetadata {
                name: "harm_search".to_string(),
                description: "Regimes that most harm creditworthy borrowers at λ = 0".to_string(),
            },
            model: ModelConfig::default(),
            thresholds: Some(exploration_threshold_grid()),
            lambdas: None,
            explore: Some(ExploreSettings::default()),
            output: OutputSettings::default(),
        }
    }

    /// Threshold grid, or the sweep default when absent
    pub fn threshold_grid(&self) -> Vec<f64> {
        self.thresholds.unwrap_or_else(default_threshold_grid).values()
    }

    /// Threshold grid, or the finer exploration default when absent
    pub fn exploration_threshold_grid(&self) -> Vec<f64> {
        self.thresholds.unwrap_or_else(exploration_threshold_grid).values()
    }

    pub fn lambda_grid(&self) -> Vec<f64> {
        self.lambdas.unwrap_or_else(default_lambda_grid).values()
    }

    pub fn explore_settings(&self) -> ExploreSettings {
        self.explore.clone().unwrap_or_default()
    }
}
