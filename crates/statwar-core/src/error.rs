//! Error types for game operations.
//!
//! Every variant is client-scoped: the operation that produced it left the
//! room untouched, and only the acting client is told about it.

use thiserror::Error;

use crate::{player::PlayerId, room::Phase};

/// Rejection reasons for room and turn operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// No live room has this code
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// Room exists but no longer accepts players
    #[error("room is not joinable")]
    RoomNotJoinable,

    /// Only the host may start the game
    #[error("only the host can start the game")]
    NotHost,

    /// Only the current player may choose the metric
    #[error("not your turn")]
    NotYourTurn,

    /// Metric name not recognized
    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),

    /// Action not valid in the room's current phase
    #[error("action not allowed while {0:?}")]
    WrongPhase(Phase),

    /// Player already sits in a room
    #[error("player {0} is already seated")]
    AlreadySeated(PlayerId),

    /// Action needs a room but the player sits in none
    #[error("not seated in a room")]
    NotSeated,

    /// Cannot deal from an empty deck
    #[error("deck has no cards")]
    EmptyDeck,

    /// Display name longer than [`MAX_NAME_LEN`](crate::player::MAX_NAME_LEN)
    #[error("name is {len} characters, at most {max} allowed")]
    NameTooLong {
        /// Characters in the rejected name
        len: usize,
        /// Longest accepted name
        max: usize,
    },
}
