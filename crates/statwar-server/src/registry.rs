//! Connection registry for session and room membership.
//!
//! The registry maintains bidirectional mappings: room → sessions (for
//! broadcast) and session → room (for routing actions and cleanup on
//! disconnect). Both directions are O(1) lookups.
//!
//! A session sits in at most one room. Membership is explicit: the driver
//! subscribes a session when it creates or joins a room, and clears it when
//! the session leaves or the room is torn down.

use std::collections::{BTreeSet, HashMap};

use statwar_core::RoomCode;

/// Information about a registered session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    /// Room the session is seated in
    pub room: Option<RoomCode>,
}

/// Registry for tracking sessions and their room.
///
/// Maintains bidirectional mappings for efficient lookups:
/// - Get all sessions in a room (for broadcast), in ascending id order
/// - Get the room a session is in (for routing and cleanup)
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Session ID → session info
    sessions: HashMap<u64, SessionInfo>,
    /// Room code → seated session IDs
    room_sessions: HashMap<RoomCode, BTreeSet<u64>>,
}

impl ConnectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    ///
    /// Returns `false` if the session already exists.
    pub fn register_session(&mut self, session_id: u64) -> bool {
        if self.sessions.contains_key(&session_id) {
            return false;
        }
        self.sessions.insert(session_id, SessionInfo::default());
        true
    }

    /// Unregister a session and drop its room membership.
    ///
    /// Returns the session info if it existed, including the room it was in.
    pub fn unregister_session(&mut self, session_id: u64) -> Option<SessionInfo> {
        let info = self.sessions.remove(&session_id)?;
        if let Some(room) = &info.room {
            self.forget_member(room, session_id);
        }
        Some(info)
    }

    /// Check if a session is registered.
    pub fn has_session(&self, session_id: u64) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Seat a session in a room.
    ///
    /// Returns `false` if the session is not registered or already sits in a
    /// room.
    pub fn subscribe(&mut self, session_id: u64, room: RoomCode) -> bool {
        let Some(info) = self.sessions.get_mut(&session_id) else {
            return false;
        };
        if info.room.is_some() {
            return false;
        }

        self.room_sessions.entry(room.clone()).or_default().insert(session_id);
        info.room = Some(room);
        true
    }

    /// Remove every session from a room.
    ///
    /// Returns the sessions that were seated there.
    pub fn clear_room(&mut self, room: &RoomCode) -> Vec<u64> {
        let members: Vec<u64> =
            self.room_sessions.remove(room).map(|s| s.into_iter().collect()).unwrap_or_default();

        for session_id in &members {
            if let Some(info) = self.sessions.get_mut(session_id) {
                info.room = None;
            }
        }
        members
    }

    /// Room a session is seated in.
    pub fn room_for_session(&self, session_id: u64) -> Option<&RoomCode> {
        self.sessions.get(&session_id)?.room.as_ref()
    }

    /// All sessions seated in a room, in ascending id order.
    pub fn sessions_in_room(&self, room: &RoomCode) -> impl Iterator<Item = u64> + '_ {
        self.room_sessions.get(room).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Total number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions seated in a room.
    pub fn room_session_count(&self, room: &RoomCode) -> usize {
        self.room_sessions.get(room).map_or(0, BTreeSet::len)
    }

    fn forget_member(&mut self, room: &RoomCode, session_id: u64) {
        if let Some(members) = self.room_sessions.get_mut(room) {
            members.remove(&session_id);
            if members.is_empty() {
                self.room_sessions.remove(room);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RoomCode {
        s.parse().unwrap()
    }

    #[test]
    fn register_and_lookup_session() {
        let mut registry = ConnectionRegistry::new();

        assert!(registry.register_session(1));
        assert!(registry.has_session(1));
        assert!(!registry.has_session(2));
        assert!(registry.room_for_session(1).is_none());
    }

    #[test]
    fn register_duplicate_session_fails() {
        let mut registry = ConnectionRegistry::new();

        assert!(registry.register_session(1));
        assert!(!registry.register_session(1));
    }

    #[test]
    fn subscribe_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        let room = code("ABCD");

        registry.register_session(2);
        registry.register_session(1);

        assert!(registry.subscribe(2, room.clone()));
        assert!(registry.subscribe(1, room.clone()));

        assert_eq!(registry.room_for_session(1), Some(&room));
        let sessions: Vec<_> = registry.sessions_in_room(&room).collect();
        assert_eq!(sessions, vec![1, 2]);
    }

    #[test]
    fn subscribe_unregistered_session_fails() {
        let mut registry = ConnectionRegistry::new();
        assert!(!registry.subscribe(999, code("ABCD")));
    }

    #[test]
    fn one_room_per_session() {
        let mut registry = ConnectionRegistry::new();
        registry.register_session(1);

        assert!(registry.subscribe(1, code("AAAA")));
        assert!(!registry.subscribe(1, code("BBBB")));
        assert_eq!(registry.room_for_session(1), Some(&code("AAAA")));
        assert_eq!(registry.room_session_count(&code("BBBB")), 0);
    }

    #[test]
    fn unregister_session_leaves_room() {
        let mut registry = ConnectionRegistry::new();
        let room = code("ABCD");

        registry.register_session(1);
        registry.register_session(2);
        registry.subscribe(1, room.clone());
        registry.subscribe(2, room.clone());

        let info = registry.unregister_session(1).unwrap();
        assert_eq!(info.room, Some(room.clone()));
        assert!(!registry.has_session(1));

        let sessions: Vec<_> = registry.sessions_in_room(&room).collect();
        assert_eq!(sessions, vec![2]);
    }

    #[test]
    fn clear_room_frees_every_member() {
        let mut registry = ConnectionRegistry::new();
        let room = code("ABCD");

        for id in 1..=3 {
            registry.register_session(id);
            registry.subscribe(id, room.clone());
        }

        assert_eq!(registry.clear_room(&room), vec![1, 2, 3]);
        assert_eq!(registry.room_session_count(&room), 0);
        assert!((1..=3).all(|id| registry.room_for_session(id).is_none()));

        // Freed sessions can sit down elsewhere
        assert!(registry.subscribe(1, code("WXYZ")));
    }

    #[test]
    fn session_count() {
        let mut registry = ConnectionRegistry::new();
        assert_eq!(registry.session_count(), 0);

        registry.register_session(1);
        registry.register_session(2);
        assert_eq!(registry.session_count(), 2);

        registry.unregister_session(1);
        assert_eq!(registry.session_count(), 1);
    }
}
