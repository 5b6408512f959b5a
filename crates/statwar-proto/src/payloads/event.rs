//! Server event payloads.
//!
//! Views are flattened snapshots: player lists carry sizes, never the hidden
//! hand contents. The only card a client ever sees before a round is its own
//! top card, delivered through [`YourTurn`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Public card data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// Card name
    pub name: String,
    /// Opaque image reference for the client
    pub image_ref: String,
    /// Metric name to value
    pub metrics: BTreeMap<String, u32>,
}

/// Public player data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player id (the player's session id)
    pub id: u64,
    /// Display name
    pub name: String,
    /// Cards left in hand
    pub hand_size: u32,
    /// Cards permanently won
    pub won_size: u32,
}

/// A card revealed in a round, with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCard {
    /// Player who revealed the card
    pub player_id: u64,
    /// The revealed card
    pub card: CardView,
}

/// Sent to the creator of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreated {
    /// Shareable room code
    pub code: String,
    /// The creator's player id
    pub player_id: u64,
}

/// Sent to a player who joined a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomJoined {
    /// Room code
    pub code: String,
    /// The joiner's player id
    pub player_id: u64,
}

/// Broadcast when the roster or host changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyUpdated {
    /// Players in turn order
    pub players: Vec<PlayerView>,
    /// Current host
    pub host_id: u64,
}

/// Broadcast once the cards are dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    /// Players in turn order with their dealt hand sizes
    pub players: Vec<PlayerView>,
    /// First chooser, absent if the deal already decided the game
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player_id: Option<u64>,
}

/// Sent to the player who chooses the next metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YourTurn {
    /// The recipient's top card
    pub card: CardView,
}

/// Broadcast after every accepted metric choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResolved {
    /// Metric the round was decided on
    pub metric: String,
    /// Revealed cards in turn order
    pub revealed: Vec<RevealedCard>,
    /// True if the round ended in a tie
    pub tie: bool,
    /// Winner of this round, absent on a tie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_winner: Option<u64>,
    /// Cards left in the showdown pot
    pub pot_size: u32,
    /// Next chooser, absent once the game is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player_id: Option<u64>,
    /// Players in turn order after the round
    pub players: Vec<PlayerView>,
}

/// Broadcast once when the game ends, just before the room is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    /// Winning player
    pub winner_id: u64,
    /// Winning player's display name
    pub winner_name: String,
}
