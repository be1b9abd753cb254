//! Session layer: cross-round game state, per-room drivers, room registry.

pub mod driver;
pub mod game;
pub mod registry;


pub use driver::{RoomCommand, RoomDriver};
pub use game::{Connectivity, GameSession, PendingTransition, Player};
pub use registry::{RoomHandle, RoomId, SessionRegistry};
