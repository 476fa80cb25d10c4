//! # Quasar Core
//!
//! Hand abstraction and state packing for four-card poker decision points.
//!
//! ## Features
//!
//! - **Hand Abstraction**: Fixed-dimension features per (board, hand) pair,
//!   clustered into K buckets with seeded iterative centroid refinement
//! - **State Packing**: Acting flag, position, stack-to-pot ratio, board and
//!   per-player range vectors packed into a `[1, P, 8 + K]` tensor
//! - **Engine Client**: JSON call-out to the external solve-one-decision binary
//!
//! ## Quick Start
//!
//! ```ignore
//! use quasar_core::bucketing::{bucket_hands_on_river, BucketingConfig};
//! use quasar_core::cards::{Board, Hand};
//! use quasar_core::transforms::pack_per_player_slice;
//!
//! // 1. Offline: bucket every hand on a river board
//! let board = Board::from_ids(&[0, 12, 25, 38, 51])?;
//! let hands = Hand::enumerate_excluding(&board);
//! let buckets = bucket_hands_on_river(&board, &hands, &BucketingConfig::default())?;
//!
//! // 2. Serving: build bucket-indexed ranges and pack them
//! let hero = buckets.bucket_range(&hero_weights)?;
//! let villain = buckets.bucket_range(&villain_weights)?;
//! let batch = pack_per_player_slice(0, &[0, 1], 2.5, &board.ids(), &[hero, villain], None)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │   Hand Abstraction       │        │   State Packing          │
//! │  - features per hand     │ bucket │  - SPR clamp + scale     │
//! │  - seeded k-means        │ ─────► │  - board padding         │
//! │  - bucket ranges         │  ids   │  - blocker zeroing       │
//! └──────────────────────────┘        └──────────────────────────┘
//!                                                  │
//!                                                  ▼
//!                                          model input [1, P, F]
//! ```

#![warn(missing_docs)]

/// Card, board and four-card hand types.
pub mod cards;

/// Hand abstraction engine.
///
/// Feature extraction and clustering of hand populations into buckets.
pub mod bucketing;

/// State packing transform.
pub mod transforms;

/// Client for the external solve-one-decision engine.
pub mod engine_api;

// Re-export commonly used types at crate root for convenience
pub use bucketing::{bucket_hands_on_river, BucketResult, BucketingConfig, BucketingError};
pub use cards::{Board, Card, CardError, Hand};
pub use transforms::{pack_per_player_slice, DecisionPoint, PackedBatch, PackingError};
