//! Authoritative engine for a declaration trick-taking card game (4-10
//! players): dealing, declarations with the last-bidder hook, suit-following
//! trick play under a trump suit, scoring, dealer rotation, and multi-round
//! progression with optional elimination.
//!
//! Transport, rendering, and persistence live outside this crate; the session
//! directory talks to a room through [`session::SessionRegistry`] using the
//! intents and events in [`protocol`].

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod protocol;
pub mod session;
pub mod telemetry;
