//! Engine configuration.
//!
//! Layers, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. a JSON document (`from_json_file` / `from_json_str`), any field optional
//! 3. environment overrides, after loading `.env` if present
//!
//! Recognised environment variables:
//!
//! - `CAUSAL_SCM_SEED` sets both the sampling and the bootstrap seed
//! - `CAUSAL_SCM_BOOTSTRAP_SIMULATIONS`
//! - `CAUSAL_SCM_CONFIDENCE_LEVEL`

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CausalError, Result};
use crate::mediation::{EstimateOptions, IdentifyOptions};
use crate::sampling::SamplingOptions;

pub const ENV_SEED: &str = "CAUSAL_SCM_SEED";
pub const ENV_BOOTSTRAP_SIMULATIONS: &str = "CAUSAL_SCM_BOOTSTRAP_SIMULATIONS";
pub const ENV_CONFIDENCE_LEVEL: &str = "CAUSAL_SCM_CONFIDENCE_LEVEL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sampling: SamplingOptions,
    pub identification: IdentifyOptions,
    pub estimation: EstimateOptions,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded engine configuration");
        Self::from_json_str(&text)
    }

    /// Defaults (or `path`, when given) with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        dotenvy::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = parse_var::<u64>(ENV_SEED, &raw)?;
            self.sampling.seed = seed;
            self.estimation.seed = seed;
        }
        if let Some(raw) = lookup(ENV_BOOTSTRAP_SIMULATIONS) {
            self.estimation.num_simulations = parse_var(ENV_BOOTSTRAP_SIMULATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CONFIDENCE_LEVEL) {
            self.estimation.confidence_level = parse_var(ENV_CONFIDENCE_LEVEL, &raw)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let est = &self.estimation;
        if !(est.confidence_level > 0.0 && est.confidence_level < 1.0) {
            return Err(CausalError::Config(format!(
                "confidence_level must be in (0, 1), got {}",
                est.confidence_level
            )));
        }
        if est.num_simulations < 2 {
            return Err(CausalError::Config(format!(
                "num_simulations must be at least 2, got {}",
                est.num_simulations
            )));
        }
        if !(est.sample_fraction > 0.0 && est.sample_fraction <= 1.0) {
            return Err(CausalError::Config(format!(
                "sample_fraction must be in (0, 1], got {}",
                est.sample_fraction
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CausalError::Config(format!("{key} has an invalid value '{raw}'")))
}
