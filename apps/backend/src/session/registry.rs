//! Owned multi-room registry.
//!
//! Each room is an explicitly constructed session behind a driver task; there
//! is no process-global game state. Closing a room drops its command channel,
//! which ends the driver.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::domain::PlayerId;
use crate::error::SessionError;
use crate::protocol::{ClientIntent, Outbound};
use crate::session::driver::{RoomCommand, RoomDriver};
use crate::session::game::GameSession;

pub type RoomId = Uuid;

/// Cheap, cloneable handle the session directory uses to feed a room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn intent(&self, from: PlayerId, intent: ClientIntent) -> Result<(), SessionError> {
        self.commands
            .send(RoomCommand::Intent { from, intent })
            .map_err(|_| SessionError::RoomClosed)
    }

    pub fn disconnect(&self, from: PlayerId) -> Result<(), SessionError> {
        self.commands
            .send(RoomCommand::Disconnect { from })
            .map_err(|_| SessionError::RoomClosed)
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a room and spawn its driver. Returns the handle plus the
    /// outbound event stream the transport must drain and route.
    pub fn create_room(
        &self,
        config: GameConfig,
    ) -> (RoomId, RoomHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let driver = RoomDriver::new(GameSession::new(config), cmd_rx, out_tx);
        tokio::spawn(driver.run());

        let id = Uuid::new_v4();
        let handle = RoomHandle { commands: cmd_tx };
        self.rooms.insert(id, handle.clone());
        (id, handle, out_rx)
    }

    pub fn room(&self, id: RoomId) -> Result<RoomHandle, SessionError> {
        self.rooms
            .get(&id)
            .map(|h| h.clone())
            .ok_or(SessionError::RoomNotFound)
    }

    /// Remove a room; its driver exits once in-flight commands are drained.
    pub fn close_room(&self, id: RoomId) -> bool {
        self.rooms.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
