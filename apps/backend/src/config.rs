//! Session configuration: player limits, capacity and disconnect policies,
//! presentation pauses, and the RNG seed.
//!
//! Environment variables must be set by the runtime environment; `from_env()`
//! reads `BACKEND_*` overrides and falls back to the defaults below.

use std::time::Duration;

use crate::error::SessionError;

/// What to do when the deck can no longer deal the round to every active
/// player (`round x active > 52`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Eliminate the lowest-scoring active players until the round fits,
    /// keeping the table playing past the deck's nominal capacity.
    EliminateLowest,
    /// End the game as soon as a round no longer fits.
    EndGame,
}

/// What to do when a seated player's connection drops mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectPolicy {
    /// Discard and reinitialize the whole session immediately.
    Reset,
    /// Pause the round and hold the seat for the window; reset on expiry.
    Grace(Duration),
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub capacity_policy: CapacityPolicy,
    pub disconnect_policy: DisconnectPolicy,
    /// Pause between a round's last trick and the score broadcast.
    pub trick_pause: Duration,
    /// Pause between the score broadcast and the next deal.
    pub round_pause: Duration,
    /// Pause after an elimination notice before dealing continues.
    pub elimination_pause: Duration,
    /// Base RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 10,
            capacity_policy: CapacityPolicy::EliminateLowest,
            disconnect_policy: DisconnectPolicy::Grace(Duration::from_secs(60)),
            trick_pause: Duration::from_secs(3),
            round_pause: Duration::from_secs(5),
            elimination_pause: Duration::from_secs(4),
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Read overrides from `BACKEND_*` environment variables.
    pub fn from_env() -> Result<Self, SessionError> {
        let mut config = Self::default();
        if let Some(v) = read_usize("BACKEND_MIN_PLAYERS")? {
            config.min_players = v;
        }
        if let Some(v) = read_usize("BACKEND_MAX_PLAYERS")? {
            config.max_players = v;
        }
        match std::env::var("BACKEND_CAPACITY_POLICY").ok().as_deref() {
            None => {}
            Some("eliminate_lowest") => config.capacity_policy = CapacityPolicy::EliminateLowest,
            Some("end_game") => config.capacity_policy = CapacityPolicy::EndGame,
            Some(other) => {
                return Err(SessionError::config(format!(
                    "BACKEND_CAPACITY_POLICY: unknown policy {other:?}"
                )))
            }
        }
        match std::env::var("BACKEND_DISCONNECT_POLICY").ok().as_deref() {
            None => {}
            Some("reset") => config.disconnect_policy = DisconnectPolicy::Reset,
            Some("grace") => {
                let secs = read_u64("BACKEND_DISCONNECT_GRACE_SECS")?.unwrap_or(60);
                config.disconnect_policy = DisconnectPolicy::Grace(Duration::from_secs(secs));
            }
            Some(other) => {
                return Err(SessionError::config(format!(
                    "BACKEND_DISCONNECT_POLICY: unknown policy {other:?}"
                )))
            }
        }
        if let Some(v) = read_u64("BACKEND_RNG_SEED")? {
            config.rng_seed = Some(v);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.min_players < 4 {
            return Err(SessionError::config("min_players must be at least 4"));
        }
        if self.max_players < self.min_players {
            return Err(SessionError::config("max_players must be >= min_players"));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    pub fn with_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect_policy = policy;
        self
    }

    /// Zero presentation pauses, for tests that step through transitions.
    pub fn without_pauses(mut self) -> Self {
        self.trick_pause = Duration::ZERO;
        self.round_pause = Duration::ZERO;
        self.elimination_pause = Duration::ZERO;
        self
    }
}

fn read_usize(name: &str) -> Result<Option<usize>, SessionError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| SessionError::config(format!("{name} must be a number, got {raw:?}"))),
    }
}

fn read_u64(name: &str) -> Result<Option<u64>, SessionError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SessionError::config(format!("{name} must be a number, got {raw:?}"))),
    }
}
