// Proptest generators for domain types.
// Card generators guarantee uniqueness where a deal would.

use proptest::prelude::*;
use rand::Rng;

use crate::domain::{Card, Rank, Suit, Trump};

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Hearts),
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
        Just(Suit::Spades),
    ]
}

pub fn rank() -> impl Strategy<Value = Rank> {
    proptest::sample::select(Rank::ALL.to_vec())
}

pub fn card() -> impl Strategy<Value = Card> {
    (suit(), rank()).prop_map(|(suit, rank)| Card { suit, rank })
}

/// A trump value, including NO_TRUMP.
pub fn trump() -> impl Strategy<Value = Trump> {
    prop_oneof![suit().prop_map(Trump::Suit), Just(Trump::NoTrump)]
}

/// `count` distinct cards, drawn as a shuffled prefix of the full deck.
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    Just(()).prop_perturb(move |_, mut rng| {
        let mut all: Vec<Card> = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                all.push(Card { suit, rank });
            }
        }
        let take = count.min(all.len());
        for i in 0..take {
            let j = rng.random_range(i..all.len());
            all.swap(i, j);
        }
        all.truncate(take);
        all
    })
}

/// A full trick of 4..=10 distinct cards.
pub fn complete_trick() -> impl Strategy<Value = Vec<Card>> {
    (4usize..=10).prop_flat_map(unique_cards)
}
