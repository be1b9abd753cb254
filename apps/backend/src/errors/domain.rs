//! Domain-level error type used across the round engine and session layer.
//!
//! This error type is transport-agnostic. The session layer maps rule
//! violations to targeted `rejected` events and never lets one escalate past
//! the offending intent.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation kinds, one per rejectable rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    OutOfTurn,
    PhaseMismatch,
    CardNotInHand,
    MustFollowSuit,
    DeclarationOutOfRange,
    ForbiddenDeclaration,
    RosterFull,
    AlreadyStarted,
    NotStarted,
    NotEnoughPlayers,
    UnknownPlayer,
    GamePaused,
    InvalidRound,
    InvalidPlayerCount,
    InvalidTrumpConversion,
    ParseCard,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input validation or business rule violation
    Validation { kind: ValidationKind, detail: String },
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            detail: detail.into(),
        }
    }

    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation {
            kind: ValidationKind::Other(detail.clone()),
            detail,
        }
    }

    pub fn kind(&self) -> &ValidationKind {
        match self {
            DomainError::Validation { kind, .. } => kind,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation { detail, .. } => detail,
        }
    }
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation { kind, detail } => {
                write!(f, "validation error ({kind:?}): {detail}")
            }
        }
    }
}

impl Error for DomainError {}
