//! Driver error types.
//!
//! Game rule failures never surface here: they become `ActionRejected` frames
//! for the acting client. These errors mean the runtime fed the driver an
//! event that does not fit its session table.

use std::fmt;

/// Errors from [`ServerDriver::process_event`](crate::ServerDriver::process_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Session not found in registry.
    ///
    /// A frame arrived for a session the driver never accepted, or one that
    /// was already closed. Drop the frame.
    SessionNotFound(u64),

    /// Session already registered.
    ///
    /// The runtime reused a live session ID. This is a logic bug - session IDs
    /// must be unique.
    SessionAlreadyExists(u64),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "session not found: {id}"),
            Self::SessionAlreadyExists(id) => write!(f, "session already exists: {id}"),
        }
    }
}

impl std::error::Error for DriverError {}
