//! Errors raised by the bucketing pipeline.

use thiserror::Error;

use super::config::ConfigError;
use crate::cards::CardError;

/// Errors that can occur while extracting features or clustering hands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BucketingError {
    /// Clustering needs at least one hand.
    #[error("cannot cluster an empty hand population")]
    EmptyPopulation,
    /// Invalid clustering parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Invalid board or hand input.
    #[error(transparent)]
    Card(#[from] CardError),
    /// A per-hand vector does not line up with the clustered population.
    #[error("expected {expected} per-hand values, got {got}")]
    LengthMismatch {
        /// Population size.
        expected: usize,
        /// Length supplied.
        got: usize,
    },
}
