//! Server error types.

use std::fmt;

use statwar_proto::ProtocolError;

use crate::server_error::DriverError;

/// Errors that can occur in the server runtime.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, unreadable TLS files, etc.).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// Transport/network error (connection failure, I/O error, etc.).
    ///
    /// May be transient (network issues) or fatal (bind address in use).
    Transport(String),

    /// Protocol error (invalid frame, payload that fails to encode).
    ///
    /// Fatal for that connection; other clients are unaffected.
    Protocol(String),

    /// Driver error (from `ServerDriver` processing).
    Driver(DriverError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Driver(err) => write!(f, "driver error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DriverError> for ServerError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
