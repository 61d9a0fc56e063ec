//! Cards, hands and the rank comparator.
//!
//! A card is a byte in `0..52`. Its rank is `value % 13` and its suit is
//! `value / 13`; only the rank takes part in a comparison.

use std::cmp::Ordering;
use std::fmt;

use crate::common::errors::{Result, WarError};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Number of cards dealt to each player, which is also the number of rounds.
pub const HAND_SIZE: usize = DECK_SIZE / 2;

/// Number of distinct ranks per suit.
pub const RANKS: u8 = 13;

/// A single playing card, guaranteed to be in `0..52`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card(u8);

impl Card {
    /// Returns `None` for values outside the deck.
    pub fn new(value: u8) -> Option<Self> {
        ((value as usize) < DECK_SIZE).then_some(Card(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn rank(self) -> u8 {
        self.0 % RANKS
    }

    pub fn suit(self) -> u8 {
        self.0 / RANKS
    }
}

impl TryFrom<u8> for Card {
    type Error = WarError;

    fn try_from(value: u8) -> Result<Self> {
        Card::new(value).ok_or_else(|| WarError::violation(format!("card byte {value} is not in 0..52")))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rank {})", self.0, self.rank())
    }
}

/// Compare two cards by rank, ignoring suit.
pub fn compare(a: Card, b: Card) -> Ordering {
    a.rank().cmp(&b.rank())
}

/// One player's 26 cards in play order: `cards()[i]` is played in round `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand([Card; HAND_SIZE]);

impl Hand {
    pub fn cards(&self) -> &[Card; HAND_SIZE] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.0.iter().copied()
    }

    /// Raw card bytes, in play order.
    pub fn to_bytes(&self) -> [u8; HAND_SIZE] {
        self.0.map(Card::value)
    }
}

impl TryFrom<&[u8]> for Hand {
    type Error = WarError;

    /// Parses a hand payload: exactly 26 valid and distinct cards.
    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HAND_SIZE {
            return Err(WarError::violation(format!(
                "hand has {} cards, expected {}",
                bytes.len(),
                HAND_SIZE
            )));
        }

        let mut seen = [false; DECK_SIZE];
        let mut cards = [Card(0); HAND_SIZE];
        for (slot, &byte) in cards.iter_mut().zip(bytes) {
            let card = Card::try_from(byte)?;
            if std::mem::replace(&mut seen[byte as usize], true) {
                return Err(WarError::violation(format!("card {byte} dealt twice")));
            }
            *slot = card;
        }
        Ok(Hand(cards))
    }
}

impl From<[Card; HAND_SIZE]> for Hand {
    fn from(cards: [Card; HAND_SIZE]) -> Self {
        Hand(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: u8) -> Card {
        Card::new(v).unwrap()
    }

    #[test]
    fn test_same_rank_different_suit_is_equal() {
        assert_eq!(compare(card(1), card(14)), Ordering::Equal);
        assert_eq!(compare(card(5), card(18)), Ordering::Equal);
    }

    #[test]
    fn test_higher_rank_wins() {
        assert_eq!(compare(card(1), card(0)), Ordering::Greater);
        assert_eq!(compare(card(12), card(0)), Ordering::Greater);
        assert_eq!(compare(card(13), card(25)), Ordering::Less);
    }

    #[test]
    fn test_compare_is_antisymmetric_and_suit_blind() {
        for a in 0..DECK_SIZE as u8 {
            assert_eq!(compare(card(a), card(a)), Ordering::Equal);
            for b in 0..DECK_SIZE as u8 {
                let ab = compare(card(a), card(b));
                assert_eq!(ab, compare(card(b), card(a)).reverse());
                assert_eq!(ab == Ordering::Equal, a % 13 == b % 13);
            }
        }
    }

    #[test]
    fn test_card_rejects_out_of_deck_values() {
        assert!(Card::new(51).is_some());
        assert!(Card::new(52).is_none());
        assert!(matches!(Card::try_from(200), Err(WarError::ProtocolViolation(_))));
        assert_eq!(card(40).suit(), 3);
        assert_eq!(card(40).rank(), 1);
    }

    #[test]
    fn test_hand_parsing() {
        let bytes: Vec<u8> = (0..26).collect();
        let hand = Hand::try_from(bytes.as_slice()).unwrap();
        assert_eq!(hand.to_bytes().to_vec(), bytes);

        assert!(Hand::try_from(&bytes[..25]).is_err());

        let mut duplicated = bytes.clone();
        duplicated[3] = 0;
        assert!(Hand::try_from(duplicated.as_slice()).is_err());

        let mut invalid = bytes;
        invalid[0] = 52;
        assert!(Hand::try_from(invalid.as_slice()).is_err());
    }
}
