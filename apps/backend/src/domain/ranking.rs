//! Trick comparison logic: lead suit, trump precedence, rank order.

use super::cards_types::{Card, Suit, Trump};

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

/// Whether `candidate` defeats `incumbent` as the best card of a trick in
/// progress.
///
/// Precedence: an active trump beats any non-trump; within the same suit the
/// higher rank wins; a card of neither the incumbent's suit nor trump never
/// wins. The first card played is the initial incumbent.
pub fn beats(candidate: Card, incumbent: Card, trump: Trump) -> bool {
    if let Some(trump_suit) = trump.suit() {
        let candidate_trump = candidate.suit == trump_suit;
        let incumbent_trump = incumbent.suit == trump_suit;
        if candidate_trump && !incumbent_trump {
            return true;
        }
        if incumbent_trump && !candidate_trump {
            return false;
        }
    }
    candidate.suit == incumbent.suit && candidate.rank > incumbent.rank
}

/// Fold `beats` over a trick in play order; the first play is the incumbent.
/// Returns the index of the winning play, or `None` for an empty trick.
pub fn winning_play_index(plays: &[Card], trump: Trump) -> Option<usize> {
    let mut best = 0usize;
    for (i, &card) in plays.iter().enumerate().skip(1) {
        if beats(card, plays[best], trump) {
            best = i;
        }
    }
    if plays.is_empty() {
        None
    } else {
        Some(best)
    }
}
