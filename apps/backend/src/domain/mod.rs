//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod cards_codec;
pub mod cards_types;
pub mod deck;
pub mod ranking;
pub mod round;
pub mod scoring;
pub mod seed_derivation;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_props_bidding;
#[cfg(test)]
mod tests_round;

// Re-exports for ergonomics
pub use bidding::{forbidden_declaration, valid_declaration_range};
pub use cards_types::{Card, Rank, Suit, Trump};
pub use deck::{Deck, DECK_SIZE};
pub use ranking::{beats, hand_has_suit, winning_play_index};
pub use round::{DeclareOutcome, PlayOutcome, PlayerId, Round, RoundPhase};
pub use seed_derivation::derive_round_seed;
