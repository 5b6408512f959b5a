//! Client action payloads.
//!
//! `StartGame` carries no fields and has no struct here.

use serde::{Deserialize, Serialize};

/// Open a new room with the sender as host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoom {
    /// Display name of the host
    pub name: String,
}

/// Join an existing room in its lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoom {
    /// Display name of the joining player
    pub name: String,
    /// Room code as typed by the user (case-insensitive)
    pub code: String,
}

/// Pick the metric that decides the current round.
///
/// The metric is sent as its name so an unrecognized value reaches the game
/// logic and is rejected as an unknown metric rather than a malformed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseStat {
    /// Metric name, e.g. `"attack"`
    pub metric: String,
}
