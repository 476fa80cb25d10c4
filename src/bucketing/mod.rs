//! Hand abstraction: features per (board, hand) and clustering into buckets.
//!
//! # Overview
//!
//! A bucket stands in for a group of strategically similar hands on one
//! board. The pipeline is:
//!
//! 1. Extract a fixed-dimension feature vector for every hand
//! 2. Sample initial centroids with a seeded generator
//! 3. Alternate nearest-centroid assignment and centroid means for a fixed
//!    number of rounds, reseeding empty clusters from random points
//!
//! # Example
//!
//! ```ignore
//! use quasar_core::bucketing::{bucket_hands_on_river, BucketingConfig};
//! use quasar_core::cards::{Board, Hand};
//!
//! let board = Board::from_ids(&[0, 12, 25, 38, 51])?;
//! let hands = Hand::enumerate_excluding(&board);
//! let result = bucket_hands_on_river(&board, &hands, &BucketingConfig::default())?;
//! println!("{} buckets over {} hands", result.k, result.len());
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod kmeans;
pub mod river;

pub use config::{BucketingConfig, ConfigError};
pub use error::BucketingError;
pub use features::{feature_matrix, hand_features, FeatureVector, FEATURE_DIM};
pub use kmeans::{KMeans, KMeansFit, RoundStats};
pub use river::{bucket_hands_on_river, bucket_hands_with_progress, hand_to_bucket_map, BucketMap, BucketResult};
