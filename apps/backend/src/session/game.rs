//! Cross-round session state: roster, seating, dealer rotation, score
//! accumulation, elimination, and the start/stop lifecycle.
//!
//! The session is a single-writer state machine: every method runs one intent
//! to completion and returns the routed events it produced. Timed transitions
//! (trick pause, round pause, reconnect window) are returned as pending work
//! for the driver's clock; the session itself never sleeps.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info, warn};

use crate::config::{CapacityPolicy, DisconnectPolicy, GameConfig};
use crate::domain::{
    derive_round_seed, round::MIN_SEATS, scoring::round_earnings, Card, PlayerId, Round,
    RoundPhase, DECK_SIZE,
};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::protocol::{
    ClientIntent, Outbound, PlayerSnapshot, PlayerStatus, RejectCode, ScoreEntry, ServerEvent,
    TrickCount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// One seated participant. Created on join, removed on lobby disconnect or
/// session reset.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub status: PlayerStatus,
    pub connectivity: Connectivity,
    /// Bumped on every mid-game disconnect; an expiry from an earlier
    /// disconnection of this seat no longer matches and is ignored.
    pub disconnect_epoch: u64,
}

/// Work the driver must apply after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTransition {
    /// Trick pause elapsed: score the completed round.
    FinishRound,
    /// Round pause elapsed: deal the next round.
    BeginRound,
    /// Elimination pause elapsed: re-check capacity and deal.
    ResumeDeal,
    /// Reconnect window expired for a disconnected seat. `epoch` pins the
    /// expiry to one particular disconnection of that seat.
    ReconnectExpiry { player: PlayerId, epoch: u64 },
}

#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    /// Roster in join order; the first joined player may start the game.
    players: Vec<Player>,
    game_started: bool,
    current_round_no: u8,
    /// Seating fixed at game start; dealer rotation walks this order.
    table_order: Vec<PlayerId>,
    /// `None` is the pre-game sentinel so the first increment yields seat 0.
    dealer_index: Option<usize>,
    round: Option<Round>,
    game_seed: u64,
    rng: ChaCha12Rng,
    pending: Vec<(PendingTransition, Duration)>,
    /// Bumped on every start and reset; invalidates timers from earlier lives.
    generation: u64,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let game_seed = config.rng_seed.unwrap_or_else(|| rand::rng().next_u64());
        Self {
            rng: ChaCha12Rng::seed_from_u64(game_seed),
            config,
            players: Vec::new(),
            game_started: false,
            current_round_no: 0,
            table_order: Vec::new(),
            dealer_index: None,
            round: None,
            game_seed,
            pending: Vec::new(),
            generation: 0,
        }
    }

    /// Monotonic session lifetime counter; bumped on start, game over, and
    /// reset, so schedulers can drop work from a previous life.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn current_round_no(&self) -> u8 {
        self.current_round_no
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Timed transitions produced by the last call; the driver schedules them.
    pub fn take_pending(&mut self) -> Vec<(PendingTransition, Duration)> {
        std::mem::take(&mut self.pending)
    }

    /// A started game is paused while any active seat is disconnected.
    pub fn is_paused(&self) -> bool {
        self.game_started
            && self.players.iter().any(|p| {
                p.status == PlayerStatus::Active && p.connectivity == Connectivity::Disconnected
            })
    }

    /// Dispatch one inbound intent. Exactly one intent mutates the session at
    /// a time; the caller serializes.
    pub fn handle_intent(&mut self, from: PlayerId, intent: ClientIntent) -> Vec<Outbound> {
        match intent {
            ClientIntent::Join { name } => self.handle_join(from, name),
            ClientIntent::Start => self.handle_start(from),
            ClientIntent::Declare { value } => self.handle_declare(from, value),
            ClientIntent::Play { card } => self.handle_play(from, card),
            ClientIntent::Chat { text } => self.handle_chat(from, text),
            ClientIntent::Reconnect { player_id } => self.handle_reconnect(player_id),
        }
    }

    fn handle_join(&mut self, id: PlayerId, name: String) -> Vec<Outbound> {
        if self.game_started {
            return vec![reject(
                id,
                RejectCode::AlreadyStarted,
                "The game has already started",
            )];
        }
        if self.players.len() >= self.config.max_players {
            return vec![reject(id, RejectCode::RoomFull, "The table is full")];
        }
        if self.players.iter().any(|p| p.id == id) {
            return vec![reject(id, RejectCode::BadRequest, "Already joined")];
        }

        info!(player = %id, name = %name, "Player joined");
        self.players.push(Player {
            id,
            name,
            score: 0,
            status: PlayerStatus::Active,
            connectivity: Connectivity::Connected,
            disconnect_epoch: 0,
        });

        let mut events = vec![Outbound::all(ServerEvent::RosterUpdate {
            players: self.snapshots(),
        })];
        if self.players.len() >= self.config.min_players {
            events.push(Outbound::to(self.players[0].id, ServerEvent::Startable));
        }
        events
    }

    fn handle_start(&mut self, from: PlayerId) -> Vec<Outbound> {
        if self.game_started {
            debug!(player = %from, "Start ignored: already started");
            return Vec::new();
        }
        match self.players.first() {
            Some(first) if first.id == from => {}
            _ => {
                debug!(player = %from, "Start ignored: not the table owner");
                return Vec::new();
            }
        }
        if self.players.len() < self.config.min_players {
            return vec![reject(
                from,
                RejectCode::NotEnoughPlayers,
                format!("Need at least {} players", self.config.min_players),
            )];
        }

        info!(players = self.players.len(), seed = self.game_seed, "Game starting");
        self.generation += 1;
        self.game_started = true;
        self.current_round_no = 0;
        self.dealer_index = None;
        for p in &mut self.players {
            p.status = PlayerStatus::Active;
            p.score = 0;
        }
        let mut order: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        order.shuffle(&mut self.rng);
        self.table_order = order;

        self.begin_round()
    }

    fn handle_declare(&mut self, from: PlayerId, value: u8) -> Vec<Outbound> {
        if let Some(events) = self.game_intent_gate(from) {
            return events;
        }
        let Some(round) = self.round.as_mut() else {
            return vec![reject(from, RejectCode::PhaseMismatch, "No round in progress")];
        };
        match round.declare(from, value) {
            Ok(outcome) => {
                debug!(player = %from, value, "Declaration recorded");
                let mut events = vec![Outbound::all(ServerEvent::DeclarationRecorded {
                    player: from,
                    value,
                })];
                if outcome.all_declared {
                    events.push(Outbound::all(ServerEvent::AllDeclared {
                        first_to_play: outcome.next_turn,
                    }));
                    events.push(Outbound::to(
                        outcome.next_turn,
                        ServerEvent::PlayPrompt { lead: None },
                    ));
                } else {
                    events.push(Outbound::to(
                        outcome.next_turn,
                        ServerEvent::DeclarePrompt {
                            round: self.current_round_no,
                            forbidden: outcome.forbidden_for_next,
                        },
                    ));
                }
                events
            }
            Err(err) => self.rejection_events(from, err),
        }
    }

    fn handle_play(&mut self, from: PlayerId, card: Card) -> Vec<Outbound> {
        if let Some(events) = self.game_intent_gate(from) {
            return events;
        }
        let Some(round) = self.round.as_mut() else {
            return vec![reject(from, RejectCode::PhaseMismatch, "No round in progress")];
        };
        match round.play(from, card) {
            Ok(outcome) => {
                debug!(player = %from, card = %card, "Card played");
                let mut events = vec![
                    Outbound::all(ServerEvent::CardPlayed { player: from, card }),
                    // Hands are private: the updated hand goes only to its owner.
                    Outbound::to(
                        from,
                        ServerEvent::HandUpdate {
                            cards: round.hand(from).to_vec(),
                        },
                    ),
                ];
                if let Some(winner) = outcome.trick_winner {
                    let tricks_won = round
                        .turn_order
                        .iter()
                        .map(|&p| TrickCount {
                            player: p,
                            won: round.tricks_won_by(p),
                        })
                        .collect();
                    events.push(Outbound::all(ServerEvent::TrickWon {
                        winner,
                        winner_name: self.player_name(winner),
                        tricks_won,
                    }));
                }
                if outcome.round_complete {
                    info!(round = self.current_round_no, "Round tricks exhausted");
                    self.pending
                        .push((PendingTransition::FinishRound, self.config.trick_pause));
                } else if let Some(next) = outcome.next_turn {
                    let lead = self.round.as_ref().and_then(|r| r.trick_lead);
                    events.push(Outbound::to(next, ServerEvent::PlayPrompt { lead }));
                }
                events
            }
            Err(err) => self.rejection_events(from, err),
        }
    }

    fn handle_chat(&mut self, from: PlayerId, text: String) -> Vec<Outbound> {
        // Chat is relayed even while the game is paused.
        let name = self
            .players
            .iter()
            .find(|p| p.id == from)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "spectator".to_string());
        vec![Outbound::all(ServerEvent::Chat {
            name,
            message: text,
        })]
    }

    fn handle_reconnect(&mut self, player_id: PlayerId) -> Vec<Outbound> {
        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            return vec![reject(player_id, RejectCode::UnknownPlayer, "No such seat held")];
        };
        if player.connectivity == Connectivity::Connected {
            return vec![reject(
                player_id,
                RejectCode::BadRequest,
                "Seat is not awaiting reconnection",
            )];
        }
        player.connectivity = Connectivity::Connected;
        info!(player = %player_id, "Player reconnected");

        let mut events = vec![Outbound::all(ServerEvent::GameResumed { player: player_id })];
        if let Some(round) = &self.round {
            // Resync the returning player and re-issue the outstanding prompt.
            events.push(Outbound::to(
                player_id,
                ServerEvent::HandUpdate {
                    cards: round.hand(player_id).to_vec(),
                },
            ));
            if !self.is_paused() && !round.is_complete() {
                events.push(self.prompt_for_turn(round));
            }
        }
        events
    }

    /// Connection loss for `from`, reported by the directory.
    pub fn handle_disconnect(&mut self, from: PlayerId) -> Vec<Outbound> {
        let Some(idx) = self.players.iter().position(|p| p.id == from) else {
            return Vec::new();
        };
        if !self.game_started {
            let player = self.players.remove(idx);
            info!(player = %player.id, name = %player.name, "Player left the lobby");
            return vec![Outbound::all(ServerEvent::RosterUpdate {
                players: self.snapshots(),
            })];
        }

        match self.config.disconnect_policy {
            DisconnectPolicy::Reset => {
                warn!(player = %from, "Disconnect mid-game: resetting session");
                self.fatal_reset("A player left; the game was reset")
            }
            DisconnectPolicy::Grace(window) => {
                let player = &mut self.players[idx];
                player.connectivity = Connectivity::Disconnected;
                player.disconnect_epoch += 1;
                if player.status != PlayerStatus::Active {
                    // An eliminated seat going away never pauses the round.
                    return Vec::new();
                }
                let epoch = player.disconnect_epoch;
                let name = player.name.clone();
                warn!(player = %from, window_secs = window.as_secs(), "Seat disconnected; game paused");
                self.pending
                    .push((PendingTransition::ReconnectExpiry { player: from, epoch }, window));
                vec![Outbound::all(ServerEvent::GamePaused {
                    player: from,
                    name,
                })]
            }
        }
    }

    /// Apply a timed transition once its delay has elapsed.
    pub fn apply_pending(&mut self, transition: PendingTransition) -> Vec<Outbound> {
        match transition {
            PendingTransition::FinishRound => self.finish_round(),
            PendingTransition::BeginRound => self.begin_round(),
            PendingTransition::ResumeDeal => self.prepare_round(),
            PendingTransition::ReconnectExpiry { player, epoch } => {
                // A reconnect followed by a fresh disconnect starts a new
                // window; this expiry only counts against its own epoch.
                let expired = self.players.iter().any(|p| {
                    p.id == player
                        && p.connectivity == Connectivity::Disconnected
                        && p.disconnect_epoch == epoch
                });
                if expired && self.game_started {
                    warn!(player = %player, "Reconnect window expired: resetting session");
                    self.fatal_reset("A player did not return; the game was reset")
                } else {
                    Vec::new()
                }
            }
        }
    }

    // Round lifecycle

    fn begin_round(&mut self) -> Vec<Outbound> {
        if !self.game_started {
            return Vec::new();
        }
        self.current_round_no += 1;
        self.prepare_round()
    }

    fn prepare_round(&mut self) -> Vec<Outbound> {
        if !self.game_started {
            return Vec::new();
        }
        let active = self.active_in_table_order();
        if active.len() < MIN_SEATS {
            return self.game_over();
        }

        if self.current_round_no as usize * active.len() > DECK_SIZE {
            match self.config.capacity_policy {
                CapacityPolicy::EndGame => return self.game_over(),
                CapacityPolicy::EliminateLowest => {
                    if active.len() <= MIN_SEATS {
                        // Nobody left to eliminate; the deck is the limit.
                        return self.game_over();
                    }
                    return self.eliminate_lowest(&active);
                }
            }
        }

        self.deal_round(active)
    }

    fn eliminate_lowest(&mut self, active: &[PlayerId]) -> Vec<Outbound> {
        // Ties break toward the earliest seat in table order.
        let victim = active
            .iter()
            .copied()
            .min_by_key(|&id| self.players.iter().find(|p| p.id == id).map_or(0, |p| p.score));
        let Some(victim) = victim else {
            return self.game_over();
        };
        let name = self.player_name(victim);
        if let Some(p) = self.players.iter_mut().find(|p| p.id == victim) {
            p.status = PlayerStatus::Eliminated;
        }
        info!(player = %victim, name = %name, round = self.current_round_no, "Player eliminated");
        self.pending
            .push((PendingTransition::ResumeDeal, self.config.elimination_pause));
        vec![
            Outbound::all(ServerEvent::PlayerEliminated {
                player: victim,
                name,
            }),
            Outbound::to(victim, ServerEvent::YouAreEliminated),
        ]
    }

    fn deal_round(&mut self, active: Vec<PlayerId>) -> Vec<Outbound> {
        let next_dealer = match self.dealer_index {
            None => 0,
            Some(i) => (i + 1) % active.len(),
        };
        self.dealer_index = Some(next_dealer);
        let dealer = active[next_dealer];

        // The seat after the dealer declares first and leads trick one.
        let first = (next_dealer + 1) % active.len();
        let mut turn_order = Vec::with_capacity(active.len());
        turn_order.extend_from_slice(&active[first..]);
        turn_order.extend_from_slice(&active[..first]);

        let mut round_rng =
            ChaCha12Rng::seed_from_u64(derive_round_seed(self.game_seed, self.current_round_no));
        let round = match Round::deal(self.current_round_no, turn_order, &mut round_rng) {
            Ok(round) => round,
            Err(err) => {
                // Capacity is pre-checked, so this is a bug, not a player error.
                warn!(error = %err, round = self.current_round_no, "Deal failed");
                return self.fatal_reset("Internal dealing error; the game was reset");
            }
        };

        info!(
            round = self.current_round_no,
            dealer = %dealer,
            trump = ?round.trump,
            players = round.turn_order.len(),
            "Round dealt"
        );

        let mut events = vec![Outbound::all(ServerEvent::RoundStarted {
            round: round.round_no,
            trump: round.trump,
            trump_card: round.trump_card,
            dealer,
            turn_order: round.turn_order.clone(),
            players: self.snapshots_with(&round),
        })];
        for &player in &round.turn_order {
            events.push(Outbound::to(
                player,
                ServerEvent::HandDealt {
                    round: round.round_no,
                    cards: round.hand(player).to_vec(),
                },
            ));
        }
        events.push(Outbound::to(
            round.turn,
            ServerEvent::DeclarePrompt {
                round: round.round_no,
                forbidden: round.forbidden_for_current(),
            },
        ));

        self.round = Some(round);
        events
    }

    fn finish_round(&mut self) -> Vec<Outbound> {
        let Some(round) = self.round.take() else {
            return Vec::new();
        };
        for (player, points) in round_earnings(&round) {
            if points > 0 {
                if let Some(p) = self.players.iter_mut().find(|p| p.id == player) {
                    p.score += points;
                }
            }
        }
        info!(round = round.round_no, "Round scored");
        self.pending
            .push((PendingTransition::BeginRound, self.config.round_pause));
        vec![Outbound::all(ServerEvent::RoundOver {
            round: round.round_no,
            scores: self.score_entries(),
        })]
    }

    fn game_over(&mut self) -> Vec<Outbound> {
        info!(round = self.current_round_no, "Game over");
        let scores = self.score_entries();
        // Full reset: a new start carries over neither scores nor seating.
        self.generation += 1;
        self.game_started = false;
        self.current_round_no = 0;
        self.dealer_index = None;
        self.table_order.clear();
        self.round = None;
        self.pending.clear();
        for p in &mut self.players {
            p.score = 0;
            p.status = PlayerStatus::Active;
        }
        vec![Outbound::all(ServerEvent::GameOver { scores })]
    }

    fn fatal_reset(&mut self, reason: &str) -> Vec<Outbound> {
        let event = Outbound::all(ServerEvent::FatalReset {
            reason: reason.to_string(),
        });
        self.generation += 1;
        self.players.clear();
        self.game_started = false;
        self.current_round_no = 0;
        self.dealer_index = None;
        self.table_order.clear();
        self.round = None;
        self.pending.clear();
        vec![event]
    }

    // Helpers

    /// Gate for game-affecting intents: the game must be running and not
    /// paused. Returns the rejection events to emit, or `None` to proceed.
    fn game_intent_gate(&self, from: PlayerId) -> Option<Vec<Outbound>> {
        if !self.game_started {
            return Some(vec![reject(
                from,
                RejectCode::NotStarted,
                "The game has not started",
            )]);
        }
        if self.is_paused() {
            return Some(vec![reject(
                from,
                RejectCode::GamePaused,
                "The game is paused awaiting a reconnection",
            )]);
        }
        None
    }

    /// Acting out of turn is a protocol violation and stays silent; rule
    /// violations produce a targeted rejection.
    fn rejection_events(&self, from: PlayerId, err: DomainError) -> Vec<Outbound> {
        if matches!(err.kind(), ValidationKind::OutOfTurn) {
            debug!(player = %from, "Ignoring out-of-turn action");
            return Vec::new();
        }
        debug!(player = %from, error = %err, "Intent rejected");
        vec![Outbound::to(
            from,
            ServerEvent::Rejected {
                code: RejectCode::from(err.kind()),
                message: err.detail().to_string(),
            },
        )]
    }

    fn prompt_for_turn(&self, round: &Round) -> Outbound {
        match round.phase {
            RoundPhase::Declaring => Outbound::to(
                round.turn,
                ServerEvent::DeclarePrompt {
                    round: round.round_no,
                    forbidden: round.forbidden_for_current(),
                },
            ),
            _ => Outbound::to(
                round.turn,
                ServerEvent::PlayPrompt {
                    lead: round.trick_lead,
                },
            ),
        }
    }

    fn active_in_table_order(&self) -> Vec<PlayerId> {
        self.table_order
            .iter()
            .copied()
            .filter(|id| {
                self.players
                    .iter()
                    .any(|p| p.id == *id && p.status == PlayerStatus::Active)
            })
            .collect()
    }

    fn player_name(&self, id: PlayerId) -> String {
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn snapshots(&self) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                name: p.name.clone(),
                score: p.score,
                status: p.status,
                connected: p.connectivity == Connectivity::Connected,
                cards_remaining: self.round.as_ref().map_or(0, |r| r.hand(p.id).len()),
            })
            .collect()
    }

    fn snapshots_with(&self, round: &Round) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                name: p.name.clone(),
                score: p.score,
                status: p.status,
                connected: p.connectivity == Connectivity::Connected,
                cards_remaining: round.hand(p.id).len(),
            })
            .collect()
    }

    fn score_entries(&self) -> Vec<ScoreEntry> {
        self.players
            .iter()
            .map(|p| ScoreEntry {
                player: p.id,
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }
}

fn reject(to: PlayerId, code: RejectCode, message: impl Into<String>) -> Outbound {
    Outbound::to(
        to,
        ServerEvent::Rejected {
            code,
            message: message.into(),
        },
    )
}
