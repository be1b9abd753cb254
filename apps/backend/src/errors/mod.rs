//! Error handling for the Bastardo backend.

pub mod domain;

pub use domain::{DomainError, ValidationKind};
