//! Per-round state machine: deal, declare, play, trick resolution.
//!
//! A `Round` is created by dealing and replaced wholesale at the next round;
//! it never survives across rounds. Phases are explicit so that actions in the
//! wrong phase are rejected structurally rather than ad hoc.

use std::collections::HashMap;

use rand::Rng;
use uuid::Uuid;

use super::bidding::{forbidden_declaration, valid_declaration_range};
use super::cards_types::{Card, Suit, Trump};
use super::deck::{Deck, DECK_SIZE};
use super::ranking::{hand_has_suit, winning_play_index};
use crate::errors::domain::{DomainError, ValidationKind};

pub type PlayerId = Uuid;

/// Trump is drawn from the deck only while rounds are short enough to leave
/// one; from this round on the rounds are played without trump.
pub const LAST_TRUMP_ROUND: u8 = 12;

/// Fewest players a round can be dealt to.
pub const MIN_SEATS: usize = 4;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RoundPhase {
    /// Players pledge trick counts in turn order.
    Declaring,
    /// Tricks are played until hands are empty.
    Playing,
    /// All tricks played; awaiting scoring.
    Complete,
}

/// Result of an accepted declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclareOutcome {
    /// All seats have declared; play begins.
    pub all_declared: bool,
    /// Player now expected to act (first leader once all have declared).
    pub next_turn: PlayerId,
    /// The one forbidden value for `next_turn`, set only when they declare last.
    pub forbidden_for_next: Option<u8>,
}

/// Result of an accepted card play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Winner of the trick this play completed, if it completed one.
    pub trick_winner: Option<PlayerId>,
    /// Hands are empty; the round's tricks are exhausted.
    pub round_complete: bool,
    /// Player expected to act next; `None` once the round is complete.
    pub next_turn: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub struct Round {
    /// Round number; also the number of cards dealt to every seat.
    pub round_no: u8,
    /// Card drawn to fix trump, kept for display.
    pub trump_card: Option<Card>,
    pub trump: Trump,
    /// Active players in play order; rotated so the last trick's winner leads.
    pub turn_order: Vec<PlayerId>,
    /// Player whose action is currently awaited.
    pub turn: PlayerId,
    pub phase: RoundPhase,
    /// Declarations in declaration order.
    pub declarations: Vec<(PlayerId, u8)>,
    /// Hands are private to their owners; only the session layer may route
    /// them, and only to the owning player.
    pub hands: HashMap<PlayerId, Vec<Card>>,
    pub tricks_won: HashMap<PlayerId, u8>,
    /// Ordered plays of the trick in progress.
    pub trick_plays: Vec<(PlayerId, Card)>,
    /// Suit of the first card of the trick in progress.
    pub trick_lead: Option<Suit>,
}

impl Round {
    /// Deal a fresh round: shuffle, deal `round_no` cards per seat in turn
    /// order, then draw the trump card from the remainder.
    pub fn deal<R: Rng + ?Sized>(
        round_no: u8,
        turn_order: Vec<PlayerId>,
        rng: &mut R,
    ) -> Result<Self, DomainError> {
        if round_no == 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidRound,
                "Round number must be >= 1",
            ));
        }
        if turn_order.len() < MIN_SEATS {
            return Err(DomainError::validation(
                ValidationKind::InvalidPlayerCount,
                format!("Need at least {MIN_SEATS} players, got {}", turn_order.len()),
            ));
        }
        if round_no as usize * turn_order.len() > DECK_SIZE {
            return Err(DomainError::validation(
                ValidationKind::InvalidRound,
                format!(
                    "Cannot deal {round_no} cards to {} players from one deck",
                    turn_order.len()
                ),
            ));
        }

        let mut deck = Deck::shuffled(rng);
        let mut hands = HashMap::with_capacity(turn_order.len());
        let mut tricks_won = HashMap::with_capacity(turn_order.len());
        for &player in &turn_order {
            let mut hand = deck.draw_many(round_no as usize);
            hand.sort();
            hands.insert(player, hand);
            tricks_won.insert(player, 0);
        }

        let trump_card = if round_no <= LAST_TRUMP_ROUND {
            deck.draw()
        } else {
            None
        };
        let trump = trump_card.map_or(Trump::NoTrump, |c| Trump::Suit(c.suit));

        let turn = turn_order[0];
        Ok(Self {
            round_no,
            trump_card,
            trump,
            turn_order,
            turn,
            phase: RoundPhase::Declaring,
            declarations: Vec::new(),
            hands,
            tricks_won,
            trick_plays: Vec::new(),
            trick_lead: None,
        })
    }

    pub fn hand(&self, player: PlayerId) -> &[Card] {
        self.hands.get(&player).map_or(&[], Vec::as_slice)
    }

    pub fn declaration(&self, player: PlayerId) -> Option<u8> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == player)
            .map(|&(_, v)| v)
    }

    pub fn tricks_won_by(&self, player: PlayerId) -> u8 {
        self.tricks_won.get(&player).copied().unwrap_or(0)
    }

    /// Tricks resolved so far this round.
    pub fn tricks_played(&self) -> u8 {
        self.tricks_won.values().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    /// The forbidden value for the player currently expected to declare, if
    /// they are the last declarer.
    pub fn forbidden_for_current(&self) -> Option<u8> {
        let declared: Vec<u8> = self.declarations.iter().map(|&(_, v)| v).collect();
        forbidden_declaration(self.round_no, &declared, self.turn_order.len())
    }

    /// Cards `player` may legally play right now, independent of turn
    /// enforcement: lead-suit cards when holding any, the whole hand otherwise.
    pub fn legal_plays(&self, player: PlayerId) -> Vec<Card> {
        if self.phase != RoundPhase::Playing {
            return Vec::new();
        }
        let hand = self.hand(player);
        if let Some(lead) = self.trick_lead {
            if hand_has_suit(hand, lead) {
                return hand.iter().copied().filter(|c| c.suit == lead).collect();
            }
        }
        hand.to_vec()
    }

    /// Record a declaration for the player at `turn`.
    pub fn declare(&mut self, who: PlayerId, value: u8) -> Result<DeclareOutcome, DomainError> {
        if self.phase != RoundPhase::Declaring {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the declaration phase",
            ));
        }
        if who != self.turn {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                "Out of turn",
            ));
        }
        let range = valid_declaration_range(self.round_no);
        if !range.contains(&value) {
            return Err(DomainError::validation(
                ValidationKind::DeclarationOutOfRange,
                format!("Declaration must be in range {range:?}"),
            ));
        }
        if self.forbidden_for_current() == Some(value) {
            return Err(DomainError::validation(
                ValidationKind::ForbiddenDeclaration,
                format!("Cannot declare {value}: pledged tricks would sum to the round number"),
            ));
        }

        self.declarations.push((who, value));

        if self.declarations.len() == self.turn_order.len() {
            // Everyone has declared; the seat after the dealer leads trick one.
            self.turn = self.turn_order[0];
            self.phase = RoundPhase::Playing;
            return Ok(DeclareOutcome {
                all_declared: true,
                next_turn: self.turn,
                forbidden_for_next: None,
            });
        }

        let idx = self
            .turn_order
            .iter()
            .position(|&p| p == who)
            .unwrap_or(0);
        self.turn = self.turn_order[(idx + 1) % self.turn_order.len()];
        Ok(DeclareOutcome {
            all_declared: false,
            next_turn: self.turn,
            forbidden_for_next: self.forbidden_for_current(),
        })
    }

    /// Play a card for the player at `turn`, enforcing suit following.
    pub fn play(&mut self, who: PlayerId, card: Card) -> Result<PlayOutcome, DomainError> {
        if self.phase != RoundPhase::Playing {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the trick-play phase",
            ));
        }
        if who != self.turn {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                "Out of turn",
            ));
        }

        let hand = self.hands.get(&who).ok_or_else(|| {
            DomainError::validation(ValidationKind::UnknownPlayer, "Player was not dealt in")
        })?;
        let Some(pos) = hand.iter().position(|&c| c == card) else {
            return Err(DomainError::validation(
                ValidationKind::CardNotInHand,
                "Card not in hand",
            ));
        };
        if let Some(lead) = self.trick_lead {
            if card.suit != lead && hand_has_suit(hand, lead) {
                return Err(DomainError::validation(
                    ValidationKind::MustFollowSuit,
                    "Must follow suit",
                ));
            }
        }

        // Accepted: move the card out of the hand into the trick.
        let removed = self
            .hands
            .get_mut(&who)
            .map(|h| h.remove(pos))
            .unwrap_or(card);
        if self.trick_plays.is_empty() {
            self.trick_lead = Some(removed.suit);
        }
        self.trick_plays.push((who, removed));

        if self.trick_plays.len() < self.turn_order.len() {
            let idx = self
                .turn_order
                .iter()
                .position(|&p| p == who)
                .unwrap_or(0);
            self.turn = self.turn_order[(idx + 1) % self.turn_order.len()];
            return Ok(PlayOutcome {
                trick_winner: None,
                round_complete: false,
                next_turn: Some(self.turn),
            });
        }

        // Trick complete: fold over play order, first card as incumbent.
        let cards: Vec<Card> = self.trick_plays.iter().map(|&(_, c)| c).collect();
        let winner_idx = winning_play_index(&cards, self.trump).unwrap_or(0);
        let winner = self.trick_plays[winner_idx].0;

        *self.tricks_won.entry(winner).or_insert(0) += 1;
        self.trick_plays.clear();
        self.trick_lead = None;

        // Winner leads the next trick: rotate the order winner-first.
        let widx = self
            .turn_order
            .iter()
            .position(|&p| p == winner)
            .unwrap_or(0);
        self.turn_order.rotate_left(widx);
        self.turn = winner;

        // Round end is inferred from hand emptiness; at a trick boundary every
        // hand holds the same number of cards.
        let round_complete = self.hand(who).is_empty();
        if round_complete {
            self.phase = RoundPhase::Complete;
        }
        Ok(PlayOutcome {
            trick_winner: Some(winner),
            round_complete,
            next_turn: (!round_complete).then_some(self.turn),
        })
    }
}
