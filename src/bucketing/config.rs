//! Configuration options for hand bucketing.
//!
//! This module provides the configuration struct that controls the
//! clustering call: how many buckets to form, how many refinement rounds
//! to run and which seed drives centroid sampling.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the bucketing pipeline.
///
/// # Example
/// ```
/// use quasar_core::bucketing::BucketingConfig;
///
/// let config = BucketingConfig::default().with_buckets(20).with_seed(7);
/// assert_eq!(config.num_buckets, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketingConfig {
    /// Requested number of buckets (K).
    ///
    /// Clamped to the population size when the population is smaller.
    pub num_buckets: usize,

    /// Number of assign/update rounds to run.
    ///
    /// Zero is allowed and returns the sampled initial centroids with every
    /// hand labelled as bucket 0.
    pub iterations: usize,

    /// Seed for centroid sampling and empty-cluster reseeding.
    pub seed: u64,

    /// Run the nearest-centroid search on the rayon thread pool.
    pub parallel: bool,

    /// Stop once the partition is a fixed point.
    ///
    /// Only fires when two consecutive rounds produced identical labels and
    /// neither round reseeded a cluster, so the result matches running the
    /// full budget.
    pub early_stop: bool,
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            num_buckets: 50,
            iterations: 50,
            seed: 42,
            parallel: true,
            early_stop: true,
        }
    }
}

impl BucketingConfig {
    /// Create a new BucketingConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small configuration for tests and quick looks.
    pub fn fast() -> Self {
        Self {
            num_buckets: 10,
            iterations: 10,
            ..Default::default()
        }
    }

    /// Builder method: set number of buckets.
    pub fn with_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = num_buckets;
        self
    }

    /// Builder method: set number of rounds.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: toggle parallel assignment.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method: toggle fixed-point early stopping.
    pub fn with_early_stop(mut self, early_stop: bool) -> Self {
        self.early_stop = early_stop;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_buckets == 0 {
            return Err(ConfigError::ZeroBuckets);
        }
        Ok(())
    }
}

/// Errors that can occur when loading or validating bucketing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// At least one bucket is required.
    #[error("num_buckets must be at least 1")]
    ZeroBuckets,
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),
    /// The config file is not valid JSON for this struct.
    #[error("failed to parse config: {0}")]
    Parse(String),
}
