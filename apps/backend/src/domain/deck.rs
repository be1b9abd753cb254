//! Deck construction, shuffling, and drawing.

use rand::seq::SliceRandom;
use rand::Rng;

use super::cards_types::{Card, Rank, Suit};

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// The remaining undealt cards of one round. Depleted by dealing and by the
/// trump draw; a fresh deck is built every round.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 (suit, rank) combinations, one each, in display order.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card { suit, rank });
            }
        }
        Self { cards }
    }

    /// A standard deck in a uniformly random order (Fisher-Yates).
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    /// Draw the top card; `None` once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draw `n` cards; fewer are returned if the deck runs out.
    pub fn draw_many(&mut self, n: usize) -> Vec<Card> {
        let take = n.min(self.cards.len());
        self.cards.split_off(self.cards.len() - take)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
