//! Unit tests for the round state machine.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use uuid::Uuid;

use crate::domain::{
    Card, PlayerId, Rank, Round, RoundPhase, Suit, Trump,
};
use crate::errors::domain::ValidationKind;

fn seats(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn deal(round_no: u8, order: &[PlayerId], seed: u64) -> Round {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    Round::deal(round_no, order.to_vec(), &mut rng).expect("deal")
}

fn kind(err: crate::errors::domain::DomainError) -> ValidationKind {
    err.kind().clone()
}

#[test]
fn deal_gives_round_no_cards_to_every_seat() {
    let order = seats(4);
    for round_no in 1..=13u8 {
        let round = deal(round_no, &order, round_no as u64);
        for &p in &order {
            assert_eq!(round.hand(p).len(), round_no as usize, "round {round_no}");
        }
    }
}

#[test]
fn dealt_hands_are_sorted_and_disjoint() {
    let order = seats(6);
    let round = deal(5, &order, 99);
    let mut all: Vec<Card> = Vec::new();
    for &p in &order {
        let hand = round.hand(p);
        let mut sorted = hand.to_vec();
        sorted.sort();
        assert_eq!(hand, &sorted[..]);
        all.extend_from_slice(hand);
    }
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 30, "dealt cards must be distinct");
}

#[test]
fn trump_is_drawn_until_the_late_rounds() {
    let order = seats(4);
    let round = deal(5, &order, 1);
    let trump_card = round.trump_card.expect("trump card drawn");
    assert_eq!(round.trump, Trump::Suit(trump_card.suit));

    // From round 13 on there is no trump (a 4-player round 13 also empties
    // the deck exactly).
    let round = deal(13, &order, 1);
    assert_eq!(round.trump_card, None);
    assert_eq!(round.trump, Trump::NoTrump);
}

#[test]
fn deal_rejects_undersized_tables_and_oversized_rounds() {
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    assert!(Round::deal(1, seats(3), &mut rng).is_err());
    assert!(Round::deal(0, seats(4), &mut rng).is_err());
    // 11 cards x 5 players = 55 > 52.
    assert!(Round::deal(11, seats(5), &mut rng).is_err());
}

#[test]
fn first_declarer_is_first_in_turn_order() {
    let order = seats(5);
    let round = deal(3, &order, 7);
    assert_eq!(round.turn, round.turn_order[0]);
    assert_eq!(round.phase, RoundPhase::Declaring);
}

#[test]
fn declarations_rotate_and_enforce_range() {
    let order = seats(4);
    let mut round = deal(3, &order, 11);
    let first = round.turn_order[0];
    let second = round.turn_order[1];

    let err = round.declare(first, 4).unwrap_err();
    assert_eq!(kind(err), ValidationKind::DeclarationOutOfRange);

    let outcome = round.declare(first, 2).unwrap();
    assert!(!outcome.all_declared);
    assert_eq!(outcome.next_turn, second);
    assert_eq!(round.turn, second);
}

#[test]
fn out_of_turn_declaration_is_rejected() {
    let order = seats(4);
    let mut round = deal(2, &order, 3);
    let intruder = round.turn_order[2];
    let err = round.declare(intruder, 1).unwrap_err();
    assert_eq!(kind(err), ValidationKind::OutOfTurn);
    assert!(round.declarations.is_empty());
}

#[test]
fn round_one_hook_forbids_the_balancing_declaration() {
    // Declarations 0, 0, 1 in round 1: the last bidder may not declare 0.
    let order = seats(4);
    let mut round = deal(1, &order, 5);
    let turn_order = round.turn_order.clone();

    round.declare(turn_order[0], 0).unwrap();
    round.declare(turn_order[1], 0).unwrap();
    let outcome = round.declare(turn_order[2], 1).unwrap();
    assert_eq!(outcome.forbidden_for_next, Some(0));
    assert_eq!(round.forbidden_for_current(), Some(0));

    let err = round.declare(turn_order[3], 0).unwrap_err();
    assert_eq!(kind(err), ValidationKind::ForbiddenDeclaration);

    let outcome = round.declare(turn_order[3], 1).unwrap();
    assert!(outcome.all_declared);
    assert_eq!(round.phase, RoundPhase::Playing);
    assert_eq!(round.turn, turn_order[0]);
}

#[test]
fn playing_before_all_declared_is_a_phase_mismatch() {
    let order = seats(4);
    let mut round = deal(2, &order, 17);
    let leader = round.turn_order[0];
    let card = round.hand(leader)[0];
    let err = round.play(leader, card).unwrap_err();
    assert_eq!(kind(err), ValidationKind::PhaseMismatch);
}

fn declare_all_zero_but_last(round: &mut Round) {
    let turn_order = round.turn_order.clone();
    for &p in &turn_order {
        let value = if round.forbidden_for_current() == Some(0) {
            1
        } else {
            0
        };
        round.declare(p, value).expect("declaration accepted");
    }
}

#[test]
fn must_follow_suit_when_holding_lead_suit() {
    let order = seats(4);
    let mut round = deal(2, &order, 23);
    declare_all_zero_but_last(&mut round);

    // Craft hands: leader opens hearts; the next player holds a heart and
    // tries to dodge with a club.
    let turn_order = round.turn_order.clone();
    round.hands.insert(
        turn_order[0],
        vec![
            Card::new(Suit::Hearts, Rank::Ace),
            Card::new(Suit::Clubs, Rank::Two),
        ],
    );
    round.hands.insert(
        turn_order[1],
        vec![
            Card::new(Suit::Hearts, Rank::Three),
            Card::new(Suit::Clubs, Rank::Five),
        ],
    );

    round
        .play(turn_order[0], Card::new(Suit::Hearts, Rank::Ace))
        .unwrap();
    assert_eq!(round.trick_lead, Some(Suit::Hearts));

    let err = round
        .play(turn_order[1], Card::new(Suit::Clubs, Rank::Five))
        .unwrap_err();
    assert_eq!(kind(err), ValidationKind::MustFollowSuit);

    // Holding no card of the lead suit, anything goes.
    round.hands.insert(
        turn_order[1],
        vec![
            Card::new(Suit::Clubs, Rank::Five),
            Card::new(Suit::Diamonds, Rank::Nine),
        ],
    );
    assert!(round
        .play(turn_order[1], Card::new(Suit::Diamonds, Rank::Nine))
        .is_ok());
}

#[test]
fn playing_a_card_not_in_hand_is_rejected() {
    let order = seats(4);
    let mut round = deal(1, &order, 31);
    declare_all_zero_but_last(&mut round);
    let leader = round.turn_order[0];
    let not_held = if round.hand(leader)[0] == Card::new(Suit::Spades, Rank::Ace) {
        Card::new(Suit::Spades, Rank::King)
    } else {
        Card::new(Suit::Spades, Rank::Ace)
    };
    let err = round.play(leader, not_held).unwrap_err();
    assert_eq!(kind(err), ValidationKind::CardNotInHand);
}

#[test]
fn single_trick_round_completes_and_counts() {
    let order = seats(4);
    let mut round = deal(1, &order, 41);
    declare_all_zero_but_last(&mut round);

    let turn_order = round.turn_order.clone();
    let mut last = None;
    for &p in &turn_order {
        let card = round.hand(p)[0];
        last = Some(round.play(p, card).unwrap());
    }
    let outcome = last.expect("four plays");
    let winner = outcome.trick_winner.expect("trick resolved");
    assert!(outcome.round_complete);
    assert_eq!(outcome.next_turn, None);
    assert_eq!(round.phase, RoundPhase::Complete);
    assert_eq!(round.tricks_played(), 1);
    assert_eq!(round.tricks_won_by(winner), 1);
    // Winner leads the (would-be) next trick.
    assert_eq!(round.turn_order[0], winner);
}

#[test]
fn winner_leads_next_trick_and_hands_shrink() {
    let order = seats(4);
    let mut round = deal(3, &order, 43);
    declare_all_zero_but_last(&mut round);

    let turn_order = round.turn_order.clone();
    for &p in &turn_order {
        let card = round.legal_plays(p)[0];
        round.play(p, card).unwrap();
    }
    let winner = round.turn_order[0];
    assert_eq!(round.turn, winner);
    assert_eq!(round.tricks_played(), 1);
    assert!(round.trick_plays.is_empty());
    assert_eq!(round.trick_lead, None);

    // Tricks played always equals round number minus cards left in any hand.
    for &p in &turn_order {
        assert_eq!(round.hand(p).len() as u8, round.round_no - round.tricks_played());
    }
}

#[test]
fn full_round_trick_totals_match_round_number() {
    let order = seats(4);
    let mut round = deal(5, &order, 47);
    declare_all_zero_but_last(&mut round);

    while round.phase == RoundPhase::Playing {
        let p = round.turn;
        let card = round.legal_plays(p)[0];
        round.play(p, card).unwrap();
    }
    assert_eq!(round.tricks_played(), 5);
    let total: u8 = round.turn_order.iter().map(|&p| round.tricks_won_by(p)).sum();
    assert_eq!(total, 5);
    for &p in &round.turn_order.clone() {
        assert!(round.hand(p).is_empty());
    }
}

#[test]
fn played_card_cannot_be_played_again() {
    let order = seats(4);
    let mut round = deal(2, &order, 53);
    declare_all_zero_but_last(&mut round);

    let turn_order = round.turn_order.clone();
    let first_card = round.hand(turn_order[0])[0];
    round.play(turn_order[0], first_card).unwrap();
    assert!(!round.hand(turn_order[0]).contains(&first_card));

    for &p in &turn_order[1..] {
        let card = round.legal_plays(p)[0];
        round.play(p, card).unwrap();
    }
    // Second trick: the same card is no longer in hand.
    if round.turn == turn_order[0] {
        let err = round.play(turn_order[0], first_card).unwrap_err();
        assert_eq!(kind(err), ValidationKind::CardNotInHand);
    }
}

#[test]
fn legal_plays_follow_the_lead() {
    let order = seats(4);
    let mut round = deal(2, &order, 59);
    declare_all_zero_but_last(&mut round);

    let turn_order = round.turn_order.clone();
    round.hands.insert(
        turn_order[0],
        vec![
            Card::new(Suit::Diamonds, Rank::Seven),
            Card::new(Suit::Spades, Rank::Two),
        ],
    );
    round.hands.insert(
        turn_order[1],
        vec![
            Card::new(Suit::Diamonds, Rank::King),
            Card::new(Suit::Hearts, Rank::Ace),
        ],
    );
    round
        .play(turn_order[0], Card::new(Suit::Diamonds, Rank::Seven))
        .unwrap();
    assert_eq!(
        round.legal_plays(turn_order[1]),
        vec![Card::new(Suit::Diamonds, Rank::King)]
    );
}
