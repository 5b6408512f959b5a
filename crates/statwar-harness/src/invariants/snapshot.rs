//! Observable state snapshots for invariant checking.
//!
//! Snapshots copy what a room exposes through its public API, so checks run
//! against a consistent view even while the simulation keeps mutating rooms.

use statwar_core::{Phase, PlayerId, Room, RoundOutcome};

/// Snapshot of every room under test.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-room snapshots.
    pub rooms: Vec<RoomSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no rooms).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single room.
    pub fn single(room: RoomSnapshot) -> Self {
        Self { rooms: vec![room] }
    }

    /// Snapshot each room in `rooms`.
    pub fn from_rooms<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Self {
        Self { rooms: rooms.into_iter().map(RoomSnapshot::from_room).collect() }
    }
}

/// Snapshot of one seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// Cards in hand.
    pub hand: usize,
    /// Cards won.
    pub won: usize,
}

/// Snapshot of one room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    /// Room code.
    pub code: String,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Players in turn order.
    pub players: Vec<PlayerSnapshot>,
    /// Current chooser.
    pub current_player_id: Option<PlayerId>,
    /// Winner once finished.
    pub winner: Option<PlayerId>,
    /// Cards in the showdown pot.
    pub pot: usize,
    /// Cards dealt at start.
    pub dealt: usize,
    /// Cards removed with departed players.
    pub discarded: usize,
    /// Whether the most recent round tied. `None` before the first round.
    pub last_round_tied: Option<bool>,
}

impl RoomSnapshot {
    /// Capture the observable state of `room`.
    pub fn from_room(room: &Room) -> Self {
        Self {
            code: room.code().to_string(),
            phase: room.phase(),
            players: room
                .players()
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id(),
                    hand: p.hand().len(),
                    won: p.won_pile().len(),
                })
                .collect(),
            current_player_id: room.current_player_id(),
            winner: room.winner(),
            pot: room.showdown_pot().len(),
            dealt: room.dealt(),
            discarded: room.discarded(),
            last_round_tied: None,
        }
    }

    /// Record the outcome of the round that produced this state.
    #[must_use]
    pub fn after_round(mut self, outcome: &RoundOutcome) -> Self {
        self.last_round_tied = Some(outcome.tie);
        self
    }

    /// Carry the previous snapshot's round history forward.
    #[must_use]
    pub fn with_last_round_tied(mut self, tied: Option<bool>) -> Self {
        self.last_round_tied = tied;
        self
    }

    /// Cards held by seated players and the pot.
    pub fn cards_in_play(&self) -> usize {
        self.players.iter().map(|p| p.hand + p.won).sum::<usize>() + self.pot
    }

    /// Look up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}
