//! Decision point -> dense per-player tensor.
//!
//! Produces `x` shaped `[1, P, 8 + K]` and `mask` shaped `[1, P]`, where P
//! is the number of players and K the longest range vector supplied.
//!
//! Feature layout per player:
//!   [0]      acting flag (1.0 for the player to act, else 0.0)
//!   [1]      position index (0..P-1, BTN = 0, clockwise)
//!   [2]      stack-to-pot ratio, clamped then scaled by 100
//!   [3:8]    board slots (card ids 0..51, -1 when absent)
//!   [8:8+K]  range weights, blocked entries zeroed, right-padded with 0.0
//!
//! This ordering is the model's input contract.

use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{ABSENT_CARD, HAND_SIZE, MAX_BOARD_CARDS};

/// Feature offset constants.
pub const FEAT_ACTING: usize = 0;
pub const FEAT_POSITION: usize = 1;
pub const FEAT_SPR: usize = 2;
pub const FEAT_BOARD: usize = 3;
pub const FEAT_RANGE: usize = FEAT_BOARD + MAX_BOARD_CARDS;

/// Fixed features ahead of the range slice.
pub const HEADER_FEATURES: usize = FEAT_RANGE;

/// Scale applied to the clamped stack-to-pot ratio.
const SPR_SCALE: f64 = 100.0;

/// Lower clamp bound for the stack-to-pot ratio.
const SPR_FLOOR: f64 = -0.5;

/// The four card ids a range entry stands for.
pub type RangeEntryCards = [i32; HAND_SIZE];

/// Errors raised while packing a decision point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackingError {
    /// One range vector is required per player.
    #[error("expected {players} range vectors, got {ranges}")]
    RangeCountMismatch {
        /// Players (length of `positions`).
        players: usize,
        /// Range vectors supplied.
        ranges: usize,
    },
    /// Identifier lists, when given, are required per player.
    #[error("expected {players} identifier lists, got {lists}")]
    IdentifierCountMismatch {
        /// Players (length of `positions`).
        players: usize,
        /// Identifier lists supplied.
        lists: usize,
    },
    /// More identifiers than range entries for a player.
    #[error("player {player}: {identifiers} identifiers for a range of length {range_len}")]
    IdentifierOverflow {
        /// Offending player.
        player: usize,
        /// Identifiers supplied.
        identifiers: usize,
        /// Range length.
        range_len: usize,
    },
    /// A board slot outside `-1..52`.
    #[error("board card {0} is outside -1..52")]
    InvalidBoardCard(i32),
    /// The decision point JSON could not be parsed.
    #[error("failed to parse decision point: {0}")]
    Parse(String),
}

/// Clamp the stack-to-pot ratio to `[-0.5, spr + 0.5]` and scale by 100.
///
/// The upper bound depends on the input, so only the floor ever binds for
/// inputs above -1.0. Below -1.0 the bounds cross and the upper one wins,
/// e.g. -2.0 packs as -150.0.
// TODO: the upper bound was probably meant to be a fixed cap; revisit
// together with the training target clamp before changing it.
pub fn scale_spr(spr: f64) -> f64 {
    let upper = spr + 0.5;
    let floored = if spr < SPR_FLOOR { SPR_FLOOR } else { spr };
    let clipped = if floored > upper { upper } else { floored };
    clipped * SPR_SCALE
}

/// Board slots in deal order, padded with [`ABSENT_CARD`] and cut to five.
pub fn pad_board(board: &[i32]) -> [i32; MAX_BOARD_CARDS] {
    let mut slots = [ABSENT_CARD; MAX_BOARD_CARDS];
    for (slot, &card) in slots.iter_mut().zip(board) {
        *slot = card;
    }
    slots
}

fn board_mask(board: &[i32]) -> u64 {
    board
        .iter()
        .filter(|&&c| (0..64).contains(&c))
        .fold(0, |m, &c| m | (1u64 << c))
}

/// Zero range entries whose cards collide with a board card.
///
/// `identifiers[i]` names the four cards behind `range[i]`. Entries beyond
/// the identifier list pass through. Without identifiers the range is
/// returned unchanged.
pub fn zero_impossible(
    range: &[f32],
    identifiers: Option<&[RangeEntryCards]>,
    board: &[i32],
) -> Result<Vec<f32>, PackingError> {
    let mut out = range.to_vec();
    let Some(identifiers) = identifiers else {
        return Ok(out);
    };
    if identifiers.len() > range.len() {
        return Err(PackingError::IdentifierOverflow {
            player: 0,
            identifiers: identifiers.len(),
            range_len: range.len(),
        });
    }

    let dead = board_mask(board);
    for (weight, cards) in out.iter_mut().zip(identifiers) {
        let blocked = cards
            .iter()
            .any(|&c| (0..64).contains(&c) && dead & (1u64 << c) != 0);
        if blocked {
            *weight = 0.0;
        }
    }
    Ok(out)
}

/// Packed model input for one decision point.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedBatch {
    /// `[1, P, F]` dense features.
    pub x: Array3<f32>,
    /// `[1, P]` activity mask, 1.0 for active players.
    pub mask: Array2<f32>,
}

impl PackedBatch {
    /// Number of player rows.
    pub fn num_players(&self) -> usize {
        self.x.len_of(Axis(1))
    }

    /// Features per player (`8 + K`).
    pub fn feature_dim(&self) -> usize {
        self.x.len_of(Axis(2))
    }

    /// Range slice length K.
    pub fn range_len(&self) -> usize {
        self.feature_dim() - HEADER_FEATURES
    }

    /// Feature row of `player`.
    pub fn row(&self, player: usize) -> ArrayView1<'_, f32> {
        self.x.index_axis(Axis(0), 0).index_axis_move(Axis(0), player)
    }

    /// `[P, F]` view without the batch axis.
    pub fn players(&self) -> ArrayView2<'_, f32> {
        self.x.index_axis(Axis(0), 0)
    }

    /// Mark `player` inactive in the mask. Packing itself never does this.
    pub fn deactivate(&mut self, player: usize) {
        if let Some(m) = self.mask.get_mut((0, player)) {
            *m = 0.0;
        }
    }
}

/// Pack per-player slices into a `[1, P, 8 + K]` batch.
///
/// `positions.len()` defines P and `ranges` must match it. When
/// `range_identifiers` is present it must hold one list per player; each
/// list zeroes blocked entries of that player's range before padding.
pub fn pack_per_player_slice(
    acting_player: usize,
    positions: &[u32],
    spr: f64,
    board: &[i32],
    ranges: &[Vec<f32>],
    range_identifiers: Option<&[Vec<RangeEntryCards>]>,
) -> Result<PackedBatch, PackingError> {
    let players = positions.len();
    if ranges.len() != players {
        return Err(PackingError::RangeCountMismatch {
            players,
            ranges: ranges.len(),
        });
    }
    if let Some(ids) = range_identifiers {
        if ids.len() != players {
            return Err(PackingError::IdentifierCountMismatch {
                players,
                lists: ids.len(),
            });
        }
    }
    let slots = pad_board(board);
    if let Some(&bad) = slots.iter().find(|&&c| !(ABSENT_CARD..52).contains(&c)) {
        return Err(PackingError::InvalidBoardCard(bad));
    }
    if acting_player >= players {
        log::warn!("acting player {} out of range for {} players; no row flagged", acting_player, players);
    }

    let spr_scaled = scale_spr(spr) as f32;
    let k = ranges.iter().map(Vec::len).max().unwrap_or(0);
    let features = HEADER_FEATURES + k;

    let mut x = Array3::<f32>::zeros((1, players, features));
    let mask = Array2::<f32>::ones((1, players));

    for (p, mut row) in x.index_axis_mut(Axis(0), 0).outer_iter_mut().enumerate() {
        row[FEAT_ACTING] = if p == acting_player { 1.0 } else { 0.0 };
        row[FEAT_POSITION] = positions[p] as f32;
        row[FEAT_SPR] = spr_scaled;
        for (i, &card) in slots.iter().enumerate() {
            row[FEAT_BOARD + i] = card as f32;
        }

        let ids = range_identifiers.map(|all| all[p].as_slice());
        let range = zero_impossible(&ranges[p], ids, &slots).map_err(|e| match e {
            PackingError::IdentifierOverflow { identifiers, range_len, .. } => PackingError::IdentifierOverflow {
                player: p,
                identifiers,
                range_len,
            },
            other => other,
        })?;
        // Shorter ranges keep their zero tail.
        for (i, w) in range.into_iter().enumerate() {
            row[FEAT_RANGE + i] = w;
        }
    }

    log::debug!("packed {} players, feature dim {}", players, features);
    Ok(PackedBatch { x, mask })
}

/// A decision point as handed over by the serving layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// Index of the player to act.
    pub acting_player: usize,
    /// Position index per player; its length is the player count.
    pub positions: Vec<u32>,
    /// Stack-to-pot ratio before clamping.
    pub spr: f64,
    /// Board card ids, 0 to 5 of them.
    #[serde(default)]
    pub board: Vec<i32>,
    /// Range vector per player.
    pub ranges: Vec<Vec<f32>>,
    /// Optional per-player card identifiers for blocker zeroing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_identifiers: Option<Vec<Vec<RangeEntryCards>>>,
}

impl DecisionPoint {
    /// Parse a decision point from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, PackingError> {
        serde_json::from_str(json).map_err(|e| PackingError::Parse(e.to_string()))
    }

    /// Pack this decision point.
    pub fn pack(&self) -> Result<PackedBatch, PackingError> {
        pack_per_player_slice(
            self.acting_player,
            &self.positions,
            self.spr,
            &self.board,
            &self.ranges,
            self.range_identifiers.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_board() {
        assert_eq!(pad_board(&[1, 2, 3]), [1, 2, 3, -1, -1]);
        assert_eq!(pad_board(&[1, 2, 3, 4, 5, 6]), [1, 2, 3, 4, 5]);
        assert_eq!(pad_board(&[]), [-1; 5]);
    }

    #[test]
    fn test_spr_scaling() {
        assert_eq!(scale_spr(2.0), 200.0);
        assert_eq!(scale_spr(-1.0), -50.0);
        assert_eq!(scale_spr(0.0), 0.0);
        assert_eq!(scale_spr(-0.25), -25.0);
        // Bounds cross below -1.0 and the upper one applies.
        assert_eq!(scale_spr(-2.0), -150.0);
        assert!(scale_spr(f64::NAN).is_nan());
    }

    #[test]
    fn test_zero_impossible() {
        let board = pad_board(&[0, 1, 2]);
        let range = [0.5, 0.7, 0.9];
        let ids = [[0, 10, 11, 12], [20, 21, 22, 23], [30, 31, 32, 2]];
        let out = zero_impossible(&range, Some(&ids), &board).unwrap();
        assert_eq!(out, vec![0.0, 0.7, 0.0]);
    }

    #[test]
    fn test_zero_impossible_without_identifiers() {
        let board = pad_board(&[0, 1, 2, 3, 4]);
        let range = [1.0, 2.0];
        assert_eq!(zero_impossible(&range, None, &board).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_zero_impossible_ignores_absent_slots() {
        // An identifier of -1 must not match the padding sentinel.
        let board = pad_board(&[5]);
        let out = zero_impossible(&[1.0], Some(&[[-1, 6, 7, 8]]), &board).unwrap();
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn test_zero_impossible_short_identifier_list() {
        let board = pad_board(&[0]);
        let out = zero_impossible(&[1.0, 1.0], Some(&[[0, 1, 2, 3]]), &board).unwrap();
        assert_eq!(out, vec![0.0, 1.0]);
        assert!(matches!(
            zero_impossible(&[1.0], Some(&[[0, 1, 2, 3], [4, 5, 6, 7]]), &board),
            Err(PackingError::IdentifierOverflow { identifiers: 2, range_len: 1, .. })
        ));
    }

    fn example_point() -> DecisionPoint {
        DecisionPoint {
            acting_player: 1,
            positions: vec![0, 1],
            spr: 3.0,
            board: vec![0, 1, 2, 3, 4],
            ranges: vec![vec![1.0; 5], vec![0.0, 1.0, 2.0, 3.0, 4.0]],
            range_identifiers: Some(vec![
                vec![[0, 5, 6, 7], [8, 9, 10, 11], [12, 13, 14, 15], [16, 17, 18, 19], [20, 21, 22, 23]],
                vec![[24, 25, 26, 27], [1, 28, 29, 30], [31, 32, 33, 34], [35, 36, 37, 38], [39, 40, 41, 42]],
            ]),
        }
    }

    #[test]
    fn test_pack_shape_and_zeroing() {
        let batch = example_point().pack().unwrap();

        assert_eq!(batch.x.shape(), &[1, 2, 8 + 5]);
        assert_eq!(batch.mask.shape(), &[1, 2]);
        assert_eq!(batch.range_len(), 5);

        assert_eq!(batch.x[[0, 1, FEAT_ACTING]], 1.0);
        assert_eq!(batch.x[[0, 0, FEAT_ACTING]], 0.0);
        assert_eq!(batch.x[[0, 0, FEAT_SPR]], 300.0);

        // Range starts at offset 8.
        assert_eq!(batch.x[[0, 0, 8]], 0.0);
        assert_eq!(batch.x[[0, 1, 8 + 1]], 0.0);
        assert_eq!(batch.x[[0, 0, 9]], 1.0);
        assert_eq!(batch.x[[0, 1, 8 + 4]], 4.0);
    }

    #[test]
    fn test_row_layout() {
        let batch = example_point().pack().unwrap();
        let row = batch.row(1);
        assert_eq!(
            row.to_vec(),
            vec![1.0, 1.0, 300.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 2.0, 3.0, 4.0]
        );
        assert!(batch.mask.iter().all(|&m| m == 1.0));
    }

    #[test]
    fn test_ranges_padded_to_longest() {
        let batch = pack_per_player_slice(
            0,
            &[0, 1, 2],
            1.0,
            &[10, 20, 30],
            &[vec![0.25], vec![0.5, 0.5, 0.5], vec![]],
            None,
        )
        .unwrap();

        assert_eq!(batch.x.shape(), &[1, 3, 11]);
        let players = batch.players();
        assert_eq!(players.row(0).slice(ndarray::s![8..]).to_vec(), vec![0.25, 0.0, 0.0]);
        assert_eq!(players.row(2).slice(ndarray::s![8..]).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(players.row(1).slice(ndarray::s![3..8]).to_vec(), vec![10.0, 20.0, 30.0, -1.0, -1.0]);
    }

    #[test]
    fn test_exactly_one_acting_row() {
        let batch = pack_per_player_slice(2, &[0, 1, 2, 3], 1.0, &[], &vec![vec![1.0]; 4], None).unwrap();
        let flags: Vec<f32> = batch.players().column(FEAT_ACTING).to_vec();
        assert_eq!(flags, vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_acting_player_out_of_range_flags_nobody() {
        let batch = pack_per_player_slice(5, &[0, 1], 1.0, &[], &[vec![], vec![]], None).unwrap();
        assert!(batch.players().column(FEAT_ACTING).iter().all(|&f| f == 0.0));
        assert_eq!(batch.feature_dim(), HEADER_FEATURES);
    }

    #[test]
    fn test_precondition_errors() {
        assert_eq!(
            pack_per_player_slice(0, &[0, 1], 1.0, &[], &[vec![1.0]], None),
            Err(PackingError::RangeCountMismatch { players: 2, ranges: 1 })
        );
        assert_eq!(
            pack_per_player_slice(0, &[0], 1.0, &[], &[vec![1.0]], Some(&[])),
            Err(PackingError::IdentifierCountMismatch { players: 1, lists: 0 })
        );
        assert_eq!(
            pack_per_player_slice(0, &[0], 1.0, &[52], &[vec![1.0]], None),
            Err(PackingError::InvalidBoardCard(52))
        );
        assert_eq!(
            pack_per_player_slice(0, &[0, 1], 1.0, &[], &[vec![1.0], vec![1.0]], Some(&[vec![], vec![[0, 1, 2, 3]; 2]])),
            Err(PackingError::IdentifierOverflow { player: 1, identifiers: 2, range_len: 1 })
        );
    }

    #[test]
    fn test_board_cards_past_five_are_dropped_before_validation() {
        let batch = pack_per_player_slice(0, &[0], 1.0, &[1, 2, 3, 4, 5, 52], &[vec![1.0]], None).unwrap();
        assert_eq!(batch.row(0).slice(ndarray::s![3..8]).to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            pack_per_player_slice(0, &[0], 1.0, &[1, 2, 3, 4, 52, 6], &[vec![1.0]], None),
            Err(PackingError::InvalidBoardCard(52))
        );
    }

    #[test]
    fn test_deactivate() {
        let mut batch = example_point().pack().unwrap();
        batch.deactivate(0);
        batch.deactivate(9);
        assert_eq!(batch.mask.row(0).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_decision_point_json() {
        let json = r#"{
            "acting_player": 0,
            "positions": [0, 1],
            "spr": 1.5,
            "board": [7, 8, 9],
            "ranges": [[0.5, 0.5], [1.0]]
        }"#;
        let point = DecisionPoint::from_json_str(json).unwrap();
        assert!(point.range_identifiers.is_none());
        let batch = point.pack().unwrap();
        assert_eq!(batch.x.shape(), &[1, 2, 10]);
        assert_eq!(batch.x[[0, 0, FEAT_SPR]], 150.0);

        assert!(matches!(DecisionPoint::from_json_str("{}"), Err(PackingError::Parse(_))));
    }
}
