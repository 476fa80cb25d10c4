//! Card, board and hand types.
//!
//! - `card`: Card ids, parsing, the absent-slot sentinel
//! - `board`: Community cards and texture summaries
//! - `hand`: Four-card private hands and population enumeration

pub mod board;
pub mod card;
pub mod hand;

pub use board::{Board, MAX_BOARD_CARDS};
pub use card::{parse_cards, Card, CardError, ABSENT_CARD};
pub use hand::{Hand, HAND_SIZE};
