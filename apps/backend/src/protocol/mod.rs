//! Message surface between the engine and the session directory (transport).
//!
//! Inbound intents and outbound events are tagged serde enums; the transport
//! serializes them as-is. Routing is explicit: every outbound event carries a
//! `Target`, and a player's hand is only ever routed to that player.

use serde::{Deserialize, Serialize};

use crate::domain::{Card, PlayerId, Suit, Trump};
use crate::errors::domain::ValidationKind;

/// Client intents, validated against the current turn/phase before acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientIntent {
    Join { name: String },
    Start,
    Declare { value: u8 },
    Play { card: Card },
    Chat { text: String },
    /// Reclaim a held seat after a connection drop, keyed by player identity.
    Reconnect { player_id: PlayerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Eliminated,
}

/// Public view of a seated player. Never includes hand contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub status: PlayerStatus,
    pub connected: bool,
    pub cards_remaining: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrickCount {
    pub player: PlayerId,
    pub won: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    RosterUpdate {
        players: Vec<PlayerSnapshot>,
    },
    /// Targeted to the player allowed to start the game.
    Startable,
    RoundStarted {
        round: u8,
        trump: Trump,
        trump_card: Option<Card>,
        dealer: PlayerId,
        turn_order: Vec<PlayerId>,
        players: Vec<PlayerSnapshot>,
    },
    /// Targeted: the receiver's own hand for the round.
    HandDealt {
        round: u8,
        cards: Vec<Card>,
    },
    /// Targeted: it is the receiver's turn to declare. `forbidden` is set only
    /// for the final declarer.
    DeclarePrompt {
        round: u8,
        forbidden: Option<u8>,
    },
    DeclarationRecorded {
        player: PlayerId,
        value: u8,
    },
    AllDeclared {
        first_to_play: PlayerId,
    },
    /// Targeted: it is the receiver's turn to play.
    PlayPrompt {
        lead: Option<Suit>,
    },
    CardPlayed {
        player: PlayerId,
        card: Card,
    },
    /// Targeted: the receiver's hand after their own play.
    HandUpdate {
        cards: Vec<Card>,
    },
    TrickWon {
        winner: PlayerId,
        winner_name: String,
        tricks_won: Vec<TrickCount>,
    },
    RoundOver {
        round: u8,
        scores: Vec<ScoreEntry>,
    },
    GameOver {
        scores: Vec<ScoreEntry>,
    },
    PlayerEliminated {
        player: PlayerId,
        name: String,
    },
    /// Targeted counterpart of `PlayerEliminated`.
    YouAreEliminated,
    /// Targeted rejection of an intent; session state is unchanged.
    Rejected {
        code: RejectCode,
        message: String,
    },
    GamePaused {
        player: PlayerId,
        name: String,
    },
    GameResumed {
        player: PlayerId,
    },
    /// The session died and was reinitialized.
    FatalReset {
        reason: String,
    },
    Chat {
        name: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectCode {
    OutOfTurn,
    PhaseMismatch,
    CardNotInHand,
    MustFollowSuit,
    DeclarationOutOfRange,
    ForbiddenDeclaration,
    RoomFull,
    AlreadyStarted,
    NotStarted,
    NotEnoughPlayers,
    UnknownPlayer,
    GamePaused,
    BadRequest,
}

impl RejectCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectCode::OutOfTurn => "out_of_turn",
            RejectCode::PhaseMismatch => "phase_mismatch",
            RejectCode::CardNotInHand => "card_not_in_hand",
            RejectCode::MustFollowSuit => "must_follow_suit",
            RejectCode::DeclarationOutOfRange => "declaration_out_of_range",
            RejectCode::ForbiddenDeclaration => "forbidden_declaration",
            RejectCode::RoomFull => "room_full",
            RejectCode::AlreadyStarted => "already_started",
            RejectCode::NotStarted => "not_started",
            RejectCode::NotEnoughPlayers => "not_enough_players",
            RejectCode::UnknownPlayer => "unknown_player",
            RejectCode::GamePaused => "game_paused",
            RejectCode::BadRequest => "bad_request",
        }
    }
}

impl From<&ValidationKind> for RejectCode {
    fn from(kind: &ValidationKind) -> Self {
        match kind {
            ValidationKind::OutOfTurn => RejectCode::OutOfTurn,
            ValidationKind::PhaseMismatch => RejectCode::PhaseMismatch,
            ValidationKind::CardNotInHand => RejectCode::CardNotInHand,
            ValidationKind::MustFollowSuit => RejectCode::MustFollowSuit,
            ValidationKind::DeclarationOutOfRange => RejectCode::DeclarationOutOfRange,
            ValidationKind::ForbiddenDeclaration => RejectCode::ForbiddenDeclaration,
            ValidationKind::RosterFull => RejectCode::RoomFull,
            ValidationKind::AlreadyStarted => RejectCode::AlreadyStarted,
            ValidationKind::NotStarted => RejectCode::NotStarted,
            ValidationKind::NotEnoughPlayers => RejectCode::NotEnoughPlayers,
            ValidationKind::UnknownPlayer => RejectCode::UnknownPlayer,
            ValidationKind::GamePaused => RejectCode::GamePaused,
            _ => RejectCode::BadRequest,
        }
    }
}

/// Who an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Player(PlayerId),
}

/// A routed outbound event.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub target: Target,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn all(event: ServerEvent) -> Self {
        Self {
            target: Target::All,
            event,
        }
    }

    pub fn to(player: PlayerId, event: ServerEvent) -> Self {
        Self {
            target: Target::Player(player),
            event,
        }
    }
}
