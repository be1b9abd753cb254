//! Declaration rules: value range and the last-bidder hook.
//!
//! The hook forbids the final declarer from making the pledged tricks sum to
//! exactly the round's trick count, so at least one player must miss.

use std::ops::RangeInclusive;

/// Valid declaration values for a round of `round_no` tricks.
pub fn valid_declaration_range(round_no: u8) -> RangeInclusive<u8> {
    0..=round_no
}

/// The one forbidden value for the next declarer, if they are the last to
/// declare.
///
/// `declared` are the values recorded so far, in declaration order. Returns
/// `None` when the next declarer is not the last one, or when the balancing
/// value already lies outside the valid range (previous declarations can
/// overshoot the round number, leaving nothing to forbid).
pub fn forbidden_declaration(round_no: u8, declared: &[u8], seats: usize) -> Option<u8> {
    if declared.len() + 1 != seats {
        return None;
    }
    let sum: i32 = declared.iter().map(|&v| v as i32).sum();
    let balance = round_no as i32 - sum;
    if (0..=round_no as i32).contains(&balance) {
        Some(balance as u8)
    } else {
        None
    }
}
