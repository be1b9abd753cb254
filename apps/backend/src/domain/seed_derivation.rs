//! RNG seed derivation for deterministic games.
//!
//! A session keeps one base seed; every round's deal derives its own seed from
//! it, so a recorded game replays identically from (seed, intents).

/// Derive the shuffle seed for a round.
///
/// Unique per (game, round); the multiplier keeps round seeds apart from any
/// future per-context derivations sharing the same base.
pub fn derive_round_seed(game_seed: u64, round_no: u8) -> u64 {
    game_seed
        .wrapping_add((round_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(1)
}
