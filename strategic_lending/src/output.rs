//! Flat output records and CSV/JSON export
//!
//! Records mirror the columns analysts expect downstream (pandas, plotting
//! scripts); the engine itself never formats results.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::explorer::ParameterRegime;
use crate::params::ModelConfig;
use crate::sweep::SweepResult;

/// One row of a regulation sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub lambda: f64,
    /// Empty when the search was degenerate
    pub t_star: Option<f64>,
    pub pi: Option<f64>,
    pub h: Option<usize>,
    pub acc_l: Option<f64>,
    pub acc_h: Option<f64>,
    pub avg_cost_l: Option<f64>,
    pub avg_cost_h: Option<f64>,
}

impl From<&SweepResult> for SweepRecord {
    fn from(result: &SweepResult) -> Self {
        let opt = result.optimum.as_ref();
        SweepRecord {
            lambda: result.lambda,
            t_star: opt.map(|o| o.t_star),
            pi: opt.map(|o| o.stats.profit),
            h: opt.map(|o| o.stats.harm),
            acc_l: opt.map(|o| o.stats.acc_low),
            acc_h: opt.map(|o| o.stats.acc_high),
            avg_cost_l: opt.map(|o| o.stats.avg_cost_low),
            avg_cost_h: opt.map(|o| o.stats.avg_cost_high),
        }
    }
}

/// One row of a parameter exploration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRecord {
    pub p_l: f64,
    pub b: f64,
    pub h: f64,
    pub k_l: f64,
    pub k_h: f64,
    pub pi_g: f64,
    pub pi_b: f64,
    pub t_star: f64,
    pub pi: f64,
    pub harm: usize,
    pub h_frac: f64,
    pub acc_l: f64,
    pub acc_h: f64,
    pub cost_l: f64,
    pub cost_h: f64,
}

impl From<&ParameterRegime> for RegimeRecord {
    fn from(regime: &ParameterRegime) -> Self {
        let p = &regime.params;
        let s = &regime.stats;
        RegimeRecord {
            p_l: p.p_low_cost,
            b: p.benefit,
            h: p.harm,
            k_l: p.k_low,
            k_h: p.k_high,
            pi_g: p.pi_good,
            pi_b: p.pi_bad,
            t_star: regime.t_star,
            pi: s.profit,
            harm: s.harm,
            h_frac: regime.h_frac,
            acc_l: s.acc_low,
            acc_h: s.acc_high,
            cost_l: s.avg_cost_low,
            cost_h: s.avg_cost_high,
        }
    }
}

/// Which analysis produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    RegulationSweep,
    RegimeExploration,
}

/// Metadata for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub kind: RunKind,
    pub name: String,
    pub config: ModelConfig,
    pub seed: u64,
    pub timestamp: String,
}

impl RunMetadata {
    pub fn new(kind: RunKind, name: impl Into<String>, config: &ModelConfig) -> Self {
        RunMetadata {
            kind,
            name: name.into(),
            config: config.clone(),
            seed: config.seed,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Metadata plus result rows, written as a single JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput<T> {
    pub metadata: RunMetadata,
    pub records: Vec<T>,
}

impl<T: Serialize> RunOutput<T> {
    pub fn new(metadata: RunMetadata, records: Vec<T>) -> Self {
        RunOutput { metadata, records }
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_csv(path, &self.records)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write `<stem>.csv` and/or `<stem>.json` into `dir`, creating it if needed
    pub fn write_all<P: AsRef<Path>>(
        &self,
        dir: P,
        stem: &str,
        csv: bool,
        json: bool,
    ) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        if csv {
            self.write_csv(dir.join(format!("{stem}.csv")))?;
        }
        if json {
            self.write_json(dir.join(format!("{stem}.json")))?;
        }
        Ok(())
    }
}

/// Write one CSV row per record with a header taken from field names
pub fn write_csv<P: AsRef<Path>, T: Serialize>(path: P, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
