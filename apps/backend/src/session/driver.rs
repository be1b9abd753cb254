//! Per-room driver task.
//!
//! One task owns one `GameSession` (single-writer): inbound commands are
//! processed strictly one at a time, and every event a command produced is
//! forwarded before the next command is taken, so clients never observe a
//! later transition's events before an earlier one's.
//!
//! Presentation pauses and reconnect windows are cooperative `tokio::time`
//! deadlines: the driver keeps serving commands (chat, reconnects) while a
//! timed transition is waiting. Game transitions hold while the session is
//! paused; reconnect expiries always fire.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::domain::PlayerId;
use crate::protocol::{ClientIntent, Outbound};
use crate::session::game::{GameSession, PendingTransition};

/// Commands delivered by the session directory.
#[derive(Debug)]
pub enum RoomCommand {
    Intent { from: PlayerId, intent: ClientIntent },
    Disconnect { from: PlayerId },
}

struct Timer {
    deadline: Instant,
    transition: PendingTransition,
    /// Session generation at schedule time; a reset invalidates older timers.
    generation: u64,
}

pub struct RoomDriver {
    session: GameSession,
    commands: mpsc::UnboundedReceiver<RoomCommand>,
    outbound: mpsc::UnboundedSender<Outbound>,
    timers: Vec<Timer>,
}

impl RoomDriver {
    pub fn new(
        session: GameSession,
        commands: mpsc::UnboundedReceiver<RoomCommand>,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        Self {
            session,
            commands,
            outbound,
            timers: Vec::new(),
        }
    }

    /// Drive the room until every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            let next = self.next_eligible();
            let deadline = next.map(|(_, d)| d).unwrap_or_else(Instant::now);

            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(RoomCommand::Intent { from, intent }) => {
                            let events = self.session.handle_intent(from, intent);
                            self.flush(events);
                        }
                        Some(RoomCommand::Disconnect { from }) => {
                            let events = self.session.handle_disconnect(from);
                            self.flush(events);
                        }
                        None => {
                            debug!("Room closed; driver exiting");
                            break;
                        }
                    }
                }
                _ = sleep_until(deadline), if next.is_some() => {
                    if let Some((idx, _)) = next {
                        let timer = self.timers.remove(idx);
                        if timer.generation == self.session.generation() {
                            let events = self.session.apply_pending(timer.transition);
                            self.flush(events);
                        }
                    }
                }
            }
        }
    }

    /// Schedule newly pending transitions, then forward events in order.
    fn flush(&mut self, events: Vec<Outbound>) {
        let generation = self.session.generation();
        for (transition, delay) in self.session.take_pending() {
            self.timers.push(Timer {
                deadline: Instant::now() + delay,
                transition,
                generation,
            });
        }
        // Invalidated timers (older generation) are dropped eagerly so a
        // stale round pause cannot outlive a reset into the next game.
        self.timers.retain(|t| t.generation == generation);
        for event in events {
            if self.outbound.send(event).is_err() {
                debug!("Outbound receiver dropped");
                return;
            }
        }
    }

    /// Earliest timer allowed to fire right now.
    fn next_eligible(&self) -> Option<(usize, Instant)> {
        let paused = self.session.is_paused();
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                matches!(t.transition, PendingTransition::ReconnectExpiry { .. }) || !paused
            })
            .min_by_key(|(_, t)| t.deadline)
            .map(|(i, t)| (i, t.deadline))
    }
}
