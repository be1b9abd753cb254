//! Round scoring: an exact declaration pays round + declared, a miss pays
//! nothing.

use super::round::{PlayerId, Round};

/// Points a player earns for a round.
pub fn round_score(round_no: u8, declared: u8, tricks_won: u8) -> u32 {
    if declared == tricks_won {
        round_no as u32 + declared as u32
    } else {
        0
    }
}

/// Per-player earnings for a completed round, in turn order.
pub fn round_earnings(round: &Round) -> Vec<(PlayerId, u32)> {
    round
        .turn_order
        .iter()
        .map(|&player| {
            let declared = round.declaration(player).unwrap_or(0);
            let won = round.tricks_won_by(player);
            (player, round_score(round.round_no, declared, won))
        })
        .collect()
}
