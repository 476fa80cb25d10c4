//! Per-hand feature extraction.
//!
//! Feature layout (8 values, `f32`):
//!   [0:4] hand suit counts: [c, d, h, s]
//!   [4]   highest hand rank
//!   [5]   second highest hand rank
//!   [6]   board max same-suit count
//!   [7]   board max same-rank count
//!
//! Values are raw counts and ranks. Every row of one clustering call uses
//! the same board summary, so the last two columns only separate hands
//! across boards.

use ndarray::Array2;

use crate::cards::{Board, Hand};

/// Dimension of a feature vector.
pub const FEATURE_DIM: usize = 8;

const FEAT_SUITS: usize = 0;
const FEAT_TOP_RANKS: usize = 4;
const FEAT_BOARD_SUIT: usize = 6;
const FEAT_BOARD_RANK: usize = 7;

/// A single hand's feature vector.
pub type FeatureVector = [f32; FEATURE_DIM];

/// Features of `hand` on `board`. Pure and bit-stable for equal inputs.
pub fn hand_features(board: &Board, hand: &Hand) -> FeatureVector {
    let (board_suit, board_rank) = board.summary();
    features_with_summary(hand, board_suit, board_rank)
}

fn features_with_summary(hand: &Hand, board_suit: usize, board_rank: usize) -> FeatureVector {
    let mut out = [0.0f32; FEATURE_DIM];

    for (slot, count) in out[FEAT_SUITS..FEAT_TOP_RANKS].iter_mut().zip(hand.suit_counts()) {
        *slot = count as f32;
    }
    let ranks = hand.ranks_desc();
    out[FEAT_TOP_RANKS] = ranks[0] as f32;
    out[FEAT_TOP_RANKS + 1] = ranks[1] as f32;
    out[FEAT_BOARD_SUIT] = board_suit as f32;
    out[FEAT_BOARD_RANK] = board_rank as f32;

    out
}

/// Stacks the features of every hand into an `[N, FEATURE_DIM]` matrix.
pub fn feature_matrix(board: &Board, hands: &[Hand]) -> Array2<f32> {
    let (board_suit, board_rank) = board.summary();
    let mut x = Array2::<f32>::zeros((hands.len(), FEATURE_DIM));
    for (mut row, hand) in x.rows_mut().into_iter().zip(hands) {
        let feats = features_with_summary(hand, board_suit, board_rank);
        for (dst, src) in row.iter_mut().zip(feats) {
            *dst = src;
        }
    }
    x
}
