//! Parameters for measurement runs.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! A fixed `seed` makes sampling, and therefore every estimate, reproducible.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Draws per estimate.
    pub sample_size: usize,

    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Bytes per symbol when counting a corpus.
    pub chunk_size: usize,

    /// Weight added to the biased pair of a joint distribution.
    pub bias_delta: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            sample_size: 10_000,
            seed: None,
            chunk_size: 2,
            bias_delta: 0.3,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading experiment config");
        let json = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize.into());
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize.into());
        }

        Ok(())
    }

    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
