//! Card representation shared by bucketing and packing.
//!
//! Cards are integers in `0..52` with `suit = id / 13` and `rank = id % 13`.
//! Fixed-width board slots use [`ABSENT_CARD`] for cards not yet dealt.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sentinel for an empty board slot.
pub const ABSENT_CARD: i32 = -1;

/// Number of distinct cards in the deck.
pub const NUM_CARDS: u8 = 52;

/// Number of ranks per suit.
pub const NUM_RANKS: usize = 13;

/// Number of suits.
pub const NUM_SUITS: usize = 4;

/// Ranks run deuce (0) to ace (12).
pub const RANK_2: u8 = 0;
pub const RANK_T: u8 = 8;
pub const RANK_A: u8 = 12;

/// Suit indices, which are also the `id / 13` blocks.
pub const SUIT_CLUBS: u8 = 0;
pub const SUIT_DIAMONDS: u8 = 1;
pub const SUIT_HEARTS: u8 = 2;
pub const SUIT_SPADES: u8 = 3;

/// Rank characters, indexed by rank.
const RANK_CHARS: [char; NUM_RANKS] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters for display, in suit index order.
const SUIT_CHARS: [char; NUM_SUITS] = ['c', 'd', 'h', 's'];

/// Errors raised while building cards, boards and hands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// Card id outside `0..52`.
    #[error("card id {0} is out of range 0..52")]
    InvalidId(i32),
    /// Text that is not a two-character card like "As".
    #[error("cannot parse card from '{0}'")]
    Parse(String),
    /// The same card appears twice where cards must be distinct.
    #[error("duplicate card {0}")]
    Duplicate(Card),
    /// More than five board cards.
    #[error("board holds at most 5 cards, got {0}")]
    BoardTooLong(usize),
    /// A hand does not have exactly four cards.
    #[error("hand needs exactly 4 cards, got {0}")]
    HandArity(usize),
}

/// One card of the 52-card deck.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    /// Card index 0-51: suit * 13 + rank
    id: u8,
}

impl Card {
    /// Card with `rank` in `0..13` and `suit` in `0..4`.
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!((rank as usize) < NUM_RANKS && (suit as usize) < NUM_SUITS);
        Self { id: suit * 13 + rank }
    }

    /// Create a card from a raw integer id, rejecting anything outside `0..52`.
    pub fn try_from_id(id: i32) -> Result<Self, CardError> {
        if (0..NUM_CARDS as i32).contains(&id) {
            Ok(Self { id: id as u8 })
        } else {
            Err(CardError::InvalidId(id))
        }
    }

    /// Deck index in `0..52`.
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The card's ID widened to the signed slot type used on the wire.
    #[inline]
    pub fn slot(&self) -> i32 {
        self.id as i32
    }

    /// Rank index, deuce = 0.
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id % 13
    }

    /// Suit index, clubs = 0.
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id / 13
    }

    /// Single-bit mask for set operations over cards.
    #[inline]
    pub fn mask(&self) -> u64 {
        1u64 << self.id
    }

    /// Rank as text (`2`..`9`, `T`, `J`, `Q`, `K`, `A`).
    pub fn rank_char(&self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    /// Suit as text (`c`, `d`, `h`, `s`).
    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parse a card from a string like "As", "Kh", "2c".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 2 {
            return Err(CardError::Parse(s.to_string()));
        }

        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == chars[0].to_ascii_uppercase())
            .ok_or_else(|| CardError::Parse(s.to_string()))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == chars[1].to_ascii_lowercase())
            .ok_or_else(|| CardError::Parse(s.to_string()))?;

        Ok(Self::new(rank as u8, suit as u8))
    }
}

impl TryFrom<i32> for Card {
    type Error = CardError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::try_from_id(id)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Parse a card list given either as ids ("0,12,25") or as text ("AhKs2c").
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == ' ' || c == '-') {
        return s
            .split(',')
            .map(str::trim)
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                let id: i32 = tok.parse().map_err(|_| CardError::Parse(tok.to_string()))?;
                Card::try_from_id(id)
            })
            .collect();
    }

    let s = s.replace([' ', ','], "");
    if !s.is_ascii() || s.len() % 2 != 0 {
        return Err(CardError::Parse(s));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s[i..i + 2].parse())
        .collect()
}
