//! # Deck Dealer
//!
//! Shuffles a fresh 52-card deck and splits it into the two hands of a
//! session. The random source is any [`rand::Rng`], so tests can seed it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::cards::{Card, Hand, DECK_SIZE, HAND_SIZE};
use crate::common::errors::{Result, WarError};
use crate::common::messages::Message;

/// The two hands of one session, with their GameStart frames already encoded.
#[derive(Debug, Clone)]
pub struct Deal {
    hands: [Hand; 2],
    frames: [Vec<u8>; 2],
}

impl Deal {
    /// Build a deal from an explicit deck order: the first 26 cards go to
    /// the first player, the last 26 to the second.
    ///
    /// The deck must be a permutation of `0..52`.
    pub fn from_deck(deck: &[u8]) -> Result<Self> {
        if deck.len() != DECK_SIZE {
            return Err(WarError::violation(format!(
                "deck has {} cards, expected {}",
                deck.len(),
                DECK_SIZE
            )));
        }
        let (first, second) = deck.split_at(HAND_SIZE);
        let first = Hand::try_from(first)?;
        let second = Hand::try_from(second)?;
        if first.iter().any(|card| second.cards().contains(&card)) {
            return Err(WarError::violation("hands overlap"));
        }
        Ok(Self::from_hands(first, second))
    }

    fn from_hands(first: Hand, second: Hand) -> Self {
        let frames = [
            Message::GameStart(first.clone()).encode(),
            Message::GameStart(second.clone()).encode(),
        ];
        Self {
            hands: [first, second],
            frames,
        }
    }

    pub fn hands(&self) -> &[Hand; 2] {
        &self.hands
    }

    /// Encoded GameStart frame for player `seat` (0 or 1).
    pub fn game_start_frame(&self, seat: usize) -> &[u8] {
        &self.frames[seat]
    }
}

/// Anything a session can ask for a deal once both players want a game.
pub trait DealSource {
    fn deal(&mut self) -> Deal;
}

/// A fixed deal, handed out as-is.
impl DealSource for Deal {
    fn deal(&mut self) -> Deal {
        self.clone()
    }
}

/// Shuffling dealer. Each dealer owns its own random source.
pub struct Dealer<R = StdRng> {
    rng: R,
}

impl Dealer<StdRng> {
    /// Dealer seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic dealer for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Dealer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Dealer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Shuffle a full deck and split it in two hands.
    pub fn deal(&mut self) -> Deal {
        let mut deck: Vec<Card> = (0..DECK_SIZE as u8).filter_map(Card::new).collect();
        deck.shuffle(&mut self.rng);

        let mut first = [deck[0]; HAND_SIZE];
        let mut second = [deck[0]; HAND_SIZE];
        first.copy_from_slice(&deck[..HAND_SIZE]);
        second.copy_from_slice(&deck[HAND_SIZE..]);
        Deal::from_hands(Hand::from(first), Hand::from(second))
    }
}

impl<R: Rng> DealSource for Dealer<R> {
    fn deal(&mut self) -> Deal {
        Dealer::deal(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::Command;
    use std::collections::HashSet;

    #[test]
    fn test_deal_covers_the_deck_once() {
        let mut dealer = Dealer::seeded(7);
        for _ in 0..20 {
            let deal = dealer.deal();
            let [first, second] = deal.hands();
            assert_eq!(first.cards().len(), HAND_SIZE);
            assert_eq!(second.cards().len(), HAND_SIZE);

            let all: HashSet<u8> = first.iter().chain(second.iter()).map(Card::value).collect();
            assert_eq!(all.len(), DECK_SIZE);
            assert!(all.iter().all(|&v| (v as usize) < DECK_SIZE));
        }
    }

    #[test]
    fn test_deals_differ_between_calls() {
        let mut dealer = Dealer::new();
        let hands: HashSet<[u8; HAND_SIZE]> = (0..10).map(|_| dealer.deal().hands()[0].to_bytes()).collect();
        // Collisions among 10 shuffles of 52 cards are practically impossible
        assert!(hands.len() >= 9);
    }

    #[test]
    fn test_seeded_dealers_are_reproducible() {
        let a = Dealer::seeded(42).deal();
        let b = Dealer::seeded(42).deal();
        assert_eq!(a.hands(), b.hands());
    }

    #[test]
    fn test_game_start_frames_match_hands() {
        let deck: Vec<u8> = (0..52).collect();
        let deal = Deal::from_deck(&deck).unwrap();

        let frame = deal.game_start_frame(0);
        assert_eq!(frame.len(), Command::GameStart.frame_len());
        assert_eq!(frame[0], Command::GameStart as u8);
        assert_eq!(&frame[1..], &deck[..26]);
        assert_eq!(&deal.game_start_frame(1)[1..], &deck[26..]);
    }

    #[test]
    fn test_from_deck_rejects_non_permutations() {
        let mut deck: Vec<u8> = (0..52).collect();
        deck[51] = 0;
        assert!(Deal::from_deck(&deck).is_err());
        assert!(Deal::from_deck(&deck[..50]).is_err());
    }
}
