//! Four-card private hands.

use std::fmt;

use super::board::Board;
use super::card::{Card, CardError, NUM_CARDS, NUM_SUITS};

/// Cards in a private hand.
pub const HAND_SIZE: usize = 4;

/// A player's four private cards, stored in the order given.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hand {
    cards: [Card; HAND_SIZE],
}

impl Hand {
    /// Create a hand from four distinct cards.
    pub fn new(cards: [Card; HAND_SIZE]) -> Result<Self, CardError> {
        let mut seen = 0u64;
        for card in &cards {
            if seen & card.mask() != 0 {
                return Err(CardError::Duplicate(*card));
            }
            seen |= card.mask();
        }
        Ok(Self { cards })
    }

    /// Create a hand from four raw card ids.
    pub fn try_from_ids(ids: [i32; HAND_SIZE]) -> Result<Self, CardError> {
        let mut cards = [Card::new(0, 0); HAND_SIZE];
        for (slot, id) in cards.iter_mut().zip(ids) {
            *slot = Card::try_from_id(id)?;
        }
        Self::new(cards)
    }

    /// Create a hand from a slice, failing unless it holds exactly four ids.
    pub fn try_from_slice(ids: &[i32]) -> Result<Self, CardError> {
        let ids: [i32; HAND_SIZE] = ids.try_into().map_err(|_| CardError::HandArity(ids.len()))?;
        Self::try_from_ids(ids)
    }

    /// The four cards.
    pub fn cards(&self) -> &[Card; HAND_SIZE] {
        &self.cards
    }

    /// Raw card ids, in the form packing uses for blocker checks.
    pub fn ids(&self) -> [i32; HAND_SIZE] {
        self.cards.map(|c| c.slot())
    }

    /// Bitmask of the hand's cards.
    pub fn mask(&self) -> u64 {
        self.cards.iter().fold(0, |m, c| m | c.mask())
    }

    /// Number of cards held in each suit.
    pub fn suit_counts(&self) -> [u8; NUM_SUITS] {
        let mut counts = [0u8; NUM_SUITS];
        for card in &self.cards {
            counts[card.suit() as usize] += 1;
        }
        counts
    }

    /// Ranks sorted from highest to lowest.
    pub fn ranks_desc(&self) -> [u8; HAND_SIZE] {
        let mut ranks = self.cards.map(|c| c.rank());
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks
    }

    /// True if any card of this hand is on the board.
    pub fn blocked_by(&self, board: &Board) -> bool {
        self.mask() & board.mask() != 0
    }

    /// Every four-card hand disjoint from `board`, in lexicographic id order.
    pub fn enumerate_excluding(board: &Board) -> Vec<Hand> {
        let dead = board.mask();
        let live: Vec<Card> = (0..NUM_CARDS)
            .filter(|id| dead & (1u64 << id) == 0)
            .map(|id| Card::new(id % 13, id / 13))
            .collect();

        let n = live.len();
        let mut hands = Vec::with_capacity(choose4(n));
        for a in 0..n {
            for b in a + 1..n {
                for c in b + 1..n {
                    for d in c + 1..n {
                        hands.push(Hand { cards: [live[a], live[b], live[c], live[d]] });
                    }
                }
            }
        }
        hands
    }
}

fn choose4(n: usize) -> usize {
    if n < HAND_SIZE {
        return 0;
    }
    n * (n - 1) * (n - 2) * (n - 3) / 24
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
