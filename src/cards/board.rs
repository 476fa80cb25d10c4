//! Community cards and board texture summaries.

use std::fmt;

use super::card::{Card, CardError, NUM_RANKS, NUM_SUITS};

/// Maximum number of community cards.
pub const MAX_BOARD_CARDS: usize = 5;

/// Community cards on the board, in deal order.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Board with no cards dealt.
    pub fn new() -> Self {
        Self { cards: Vec::with_capacity(MAX_BOARD_CARDS) }
    }

    /// Create a board from distinct cards, at most five.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CardError> {
        if cards.len() > MAX_BOARD_CARDS {
            return Err(CardError::BoardTooLong(cards.len()));
        }
        let mut seen = 0u64;
        for card in &cards {
            if seen & card.mask() != 0 {
                return Err(CardError::Duplicate(*card));
            }
            seen |= card.mask();
        }
        Ok(Self { cards })
    }

    /// Create a board from raw card ids.
    pub fn from_ids(ids: &[i32]) -> Result<Self, CardError> {
        let cards = ids
            .iter()
            .map(|&id| Card::try_from_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cards(cards)
    }

    /// Cards dealt so far.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True before the flop.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in deal order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Raw card ids in deal order.
    pub fn ids(&self) -> Vec<i32> {
        self.cards.iter().map(Card::slot).collect()
    }

    /// Bitmask of every card on the board.
    pub fn mask(&self) -> u64 {
        self.cards.iter().fold(0, |m, c| m | c.mask())
    }

    /// True if `card` is on the board.
    pub fn contains(&self, card: Card) -> bool {
        self.mask() & card.mask() != 0
    }

    /// Largest number of board cards sharing one suit (0 on an empty board).
    pub fn max_suit_count(&self) -> usize {
        let mut counts = [0usize; NUM_SUITS];
        for card in &self.cards {
            counts[card.suit() as usize] += 1;
        }
        counts.into_iter().max().unwrap_or(0)
    }

    /// Largest number of board cards sharing one rank (0 on an empty board).
    pub fn max_rank_count(&self) -> usize {
        let mut counts = [0usize; NUM_RANKS];
        for card in &self.cards {
            counts[card.rank() as usize] += 1;
        }
        counts.into_iter().max().unwrap_or(0)
    }

    /// Texture summary: `(max same-suit count, max same-rank count)`.
    pub fn summary(&self) -> (usize, usize) {
        (self.max_suit_count(), self.max_rank_count())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_summary() {
        // 2c, Ac, Ad, Ah, As
        let board = Board::from_ids(&[0, 12, 25, 38, 51]).unwrap();
        assert_eq!(board.len(), 5);
        assert_eq!(board.max_suit_count(), 2);
        assert_eq!(board.max_rank_count(), 4);
        assert_eq!(board.to_string(), "2cAcAdAhAs");
    }

    #[test]
    fn test_empty_board_summary() {
        let board = Board::new();
        assert_eq!(board.summary(), (0, 0));
    }

    #[test]
    fn test_board_validation() {
        assert_eq!(Board::from_ids(&[1, 2, 3, 4, 5, 6]), Err(CardError::BoardTooLong(6)));
        assert!(matches!(Board::from_ids(&[7, 7]), Err(CardError::Duplicate(_))));
        assert_eq!(Board::from_ids(&[60]), Err(CardError::InvalidId(60)));
    }

    #[test]
    fn test_contains() {
        let board = Board::from_ids(&[0, 1, 2]).unwrap();
        assert!(board.contains(Card::try_from_id(1).unwrap()));
        assert!(!board.contains(Card::try_from_id(3).unwrap()));
        assert_eq!(board.ids(), vec![0, 1, 2]);
    }
}
