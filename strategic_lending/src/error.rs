//! Error types for the strategic lending simulation

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value or grid failed validation
    #[error("invalid configuration `{field}`: {reason}")]
    Config { field: &'static str, reason: String },

    #[error("creditworthiness distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Config {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_field() {
        let err = Error::config("k_low", "must be > 0, got 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration `k_low`: must be > 0, got 0"
        );
    }
}
