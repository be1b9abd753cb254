//! Backend test support utilities
//!
//! This crate provides utilities shared by the backend's unit and integration
//! tests: unified logging initialization and unique-name helpers.

pub mod logging;
pub mod unique_helpers;
