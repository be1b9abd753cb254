//! Core card-related types: Card, Rank, Suit, Trump

use crate::errors::domain::{DomainError, ValidationKind};

/// Suit order is the table's display order (hearts first); it carries no
/// gameplay meaning beyond sorting a hand for presentation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Hearts,
    Clubs,
    Diamonds,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Clubs, Suit::Diamonds, Suit::Spades];
}

/// Trump for a round: one of the four suits, or the no-trump sentinel used in
/// late rounds and when the deck cannot supply a trump card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Trump {
    Suit(Suit),
    NoTrump,
}

impl Trump {
    /// The trump suit, if trump is active this round.
    pub fn suit(self) -> Option<Suit> {
        match self {
            Trump::Suit(s) => Some(s),
            Trump::NoTrump => None,
        }
    }
}

impl From<Suit> for Trump {
    fn from(suit: Suit) -> Self {
        Trump::Suit(suit)
    }
}

impl TryFrom<Trump> for Suit {
    type Error = DomainError;

    fn try_from(trump: Trump) -> Result<Self, Self::Error> {
        trump.suit().ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidTrumpConversion,
                "Cannot convert NoTrump to Suit",
            )
        })
    }
}

/// Rank order doubles as trick-comparison order: Two low, Ace high.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }
}

// Note: Ord on Card is only for stable display sorting: suit order H<C<D<S,
// then rank. Never use it for trick resolution; that needs lead and trump.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.suit
            .cmp(&other.suit)
            .then_with(|| self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
