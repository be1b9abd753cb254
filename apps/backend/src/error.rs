use thiserror::Error;

use crate::errors::domain::DomainError;

/// Errors surfaced by the session/registry layer to the embedding transport.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room closed")]
    RoomClosed,
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl SessionError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}
