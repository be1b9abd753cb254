//! Property-based tests for the declaration hook.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use uuid::Uuid;

use crate::domain::{forbidden_declaration, PlayerId, Round, RoundPhase};

proptest! {
    /// The last declarer is refused a value exactly when it would balance the
    /// pledged tricks to the round number.
    #[test]
    fn hook_forbids_exactly_the_balancing_value(
        round_no in 1u8..=10,
        previous in proptest::collection::vec(0u8..=10, 3..=9),
        value in 0u8..=10,
    ) {
        prop_assume!(previous.iter().all(|&v| v <= round_no));
        prop_assume!(value <= round_no);
        let seats = previous.len() + 1;
        let sum: u32 = previous.iter().map(|&v| v as u32).sum();

        let forbidden = forbidden_declaration(round_no, &previous, seats);
        let balances = sum + value as u32 == round_no as u32;
        prop_assert_eq!(forbidden == Some(value), balances,
            "round={} previous={:?} value={}", round_no, previous, value);
    }

    /// A full declaration phase never lets the pledges sum to the round
    /// number, whatever values the players try.
    #[test]
    fn declared_sum_never_equals_round(
        round_no in 1u8..=8,
        seats in 4usize..=6,
        seed in any::<u64>(),
        raw in proptest::collection::vec(any::<u8>(), 6),
    ) {
        let order: Vec<PlayerId> = (0..seats).map(|_| Uuid::new_v4()).collect();
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let mut round = Round::deal(round_no, order.clone(), &mut rng).expect("deal");

        for (i, &player) in order.iter().enumerate() {
            let mut value = raw[i % raw.len()] % (round_no + 1);
            if round.forbidden_for_current() == Some(value) {
                // Exactly one value is forbidden, so the neighbor is legal.
                value = (value + 1) % (round_no + 1);
            }
            prop_assert!(round.declare(player, value).is_ok());
        }

        prop_assert_eq!(round.phase, RoundPhase::Playing);
        let sum: u32 = round.declarations.iter().map(|&(_, v)| v as u32).sum();
        prop_assert_ne!(sum, round_no as u32);
    }
}
