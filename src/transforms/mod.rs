//! Transforms from game state to model input.
//!
//! - `packing`: per-player dense slices (acting flag, position, SPR, board,
//!   range) stacked into a `[1, P, F]` tensor with an activity mask

pub mod packing;

pub use packing::{
    pack_per_player_slice, pad_board, scale_spr, zero_impossible, DecisionPoint, PackedBatch, PackingError,
    RangeEntryCards, HEADER_FEATURES,
};
