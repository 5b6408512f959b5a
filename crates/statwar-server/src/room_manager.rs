//! Room Manager
//!
//! Owns every live room, keyed by its code. Rooms must be explicitly created
//! (no lazy creation); a code only ever names one live room, and a room that
//! loses its last player is removed on the spot.
//!
//! The manager is a plain owned value inside the driver. There is no global
//! room table.

use std::collections::HashMap;

use statwar_core::{
    Deck, Departure, Environment, GameError, PlayerId, Room, RoomCode, RoundOutcome,
};

/// Live rooms by code.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a lobby hosted by `host_id`.
    ///
    /// Draws codes from `env` until one is not in use.
    pub fn create_room<E: Environment>(
        &mut self,
        host_id: PlayerId,
        host_name: impl Into<String>,
        env: &E,
    ) -> (RoomCode, PlayerId) {
        let code = loop {
            let candidate = RoomCode::generate(env);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        self.rooms.insert(code.clone(), Room::new(code.clone(), host_id, host_name));
        (code, host_id)
    }

    /// Seat a player in an existing lobby.
    ///
    /// # Errors
    ///
    /// - `GameError::RoomNotFound` if no live room has this code
    /// - `GameError::RoomNotJoinable` if the game has started
    /// - `GameError::AlreadySeated` if the player is already in the room
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Result<PlayerId, GameError> {
        self.room_mut(code)?.join(player_id, name)?;
        Ok(player_id)
    }

    /// Deal a freshly shuffled deck and begin play.
    ///
    /// # Errors
    ///
    /// - `GameError::RoomNotFound` if no live room has this code
    /// - Any error from [`Room::start`]
    pub fn start_game<E: Environment>(
        &mut self,
        code: &RoomCode,
        requester: PlayerId,
        env: &E,
    ) -> Result<&Room, GameError> {
        let room = self.room_mut(code)?;
        room.start(requester, Deck::shuffled(env))?;
        Ok(&*room)
    }

    /// Play one round on `metric`.
    ///
    /// # Errors
    ///
    /// - `GameError::RoomNotFound` if no live room has this code
    /// - Any error from [`Room::resolve_turn`]
    pub fn choose_stat(
        &mut self,
        code: &RoomCode,
        requester: PlayerId,
        metric: &str,
    ) -> Result<RoundOutcome, GameError> {
        self.room_mut(code)?.resolve_turn(requester, metric)
    }

    /// Remove a player, deleting the room if it empties.
    ///
    /// Returns `None` if the room or the player does not exist.
    pub fn remove_player(&mut self, code: &RoomCode, player_id: PlayerId) -> Option<Departure> {
        let departure = self.rooms.get_mut(code)?.remove_player(player_id)?;
        if departure.room_empty {
            self.rooms.remove(code);
        }
        Some(departure)
    }

    /// Delete a room. Idempotent.
    pub fn remove_room(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    /// Check if a room exists.
    pub fn has_room(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Look up a room.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// All live rooms, in no particular order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    fn room_mut(&mut self, code: &RoomCode) -> Result<&mut Room, GameError> {
        self.rooms.get_mut(code).ok_or_else(|| GameError::RoomNotFound(code.to_string()))
    }
}
