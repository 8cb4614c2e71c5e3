//! Configuration module for Ferrite widgets
//!
//! This module handles the user's widget rule configuration, including
//! serialization/deserialization to/from JSON and persistent storage in the
//! platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
