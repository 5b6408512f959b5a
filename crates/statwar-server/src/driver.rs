//! Server driver.
//!
//! Sans-IO gateway between connections and rooms. Ties together the
//! ConnectionRegistry (session-to-room mapping) and the RoomManager (game
//! state). The runtime feeds it [`ServerEvent`]s and executes the
//! [`ServerAction`]s it returns; the driver itself never touches a socket.
//!
//! # Routing
//!
//! Every client action is routed through the sender's registered room, never
//! through a room code the client claims. A failed precondition produces one
//! `ActionRejected` for the sender and leaves every room untouched.
//!
//! # Event order
//!
//! After an accepted metric choice the room receives `RoundResolved`, then
//! either the next chooser receives `YourTurn` or the room receives
//! `GameOver` and is torn down. Broadcast recipients are resolved when the
//! action is emitted, so a `GameOver` still reaches the players of the room it
//! closes.

use std::time::Instant;

use statwar_core::{
    Card, Environment, GameError, Metric, Player, PlayerId, Room, RoomCode, RoundOutcome,
    validate_name,
};
use statwar_proto::{
    Frame, Payload,
    payloads::{
        RejectPayload, action,
        event::{self, CardView, PlayerView, RevealedCard},
    },
};

use crate::{registry::ConnectionRegistry, room_manager::RoomManager, server_error::DriverError};

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Maximum concurrent connections
    pub max_connections: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_connections: 10_000 }
    }
}

/// Events that the server driver processes.
///
/// These are produced by the external runtime (simulation or production).
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A new connection was accepted
    ConnectionAccepted {
        /// Unique connection ID assigned by the runtime
        session_id: u64,
    },

    /// A frame was received from a connection
    FrameReceived {
        /// Connection that sent the frame
        session_id: u64,
        /// The received frame
        frame: Frame,
    },

    /// A connection was closed (by peer or error)
    ConnectionClosed {
        /// Connection that was closed
        session_id: u64,
        /// Reason for closure
        reason: String,
    },
}

/// Actions that the server driver produces.
///
/// These are executed by runtime-specific code (production or simulation).
/// Generic over `I` (Instant type) to support virtual time in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerAction<I = Instant> {
    /// Send a payload to one session
    SendToSession {
        /// Target session ID
        session_id: u64,
        /// Payload to send
        payload: Payload,
    },

    /// Send a payload to every session seated in a room
    BroadcastToRoom {
        /// Room the broadcast belongs to
        room: RoomCode,
        /// Sessions seated in the room when the action was emitted
        sessions: Vec<u64>,
        /// Payload to send
        payload: Payload,
    },

    /// Close a connection
    CloseConnection {
        /// Session to close
        session_id: u64,
        /// Reason for closure
        reason: String,
    },

    /// Log a message (for debugging/monitoring)
    Log {
        /// Log level
        level: LogLevel,
        /// Message to log
        message: String,
        /// When the event occurred
        timestamp: I,
    },
}

/// Log levels for server actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

type Actions<I> = Vec<ServerAction<I>>;

/// Action-based server driver.
///
/// Orchestrates session management, room lifecycle and turn routing.
pub struct ServerDriver<E: Environment> {
    /// Session/room registry
    registry: ConnectionRegistry,
    /// Live rooms
    rooms: RoomManager,
    /// Environment (time, RNG)
    env: E,
    /// Driver configuration
    config: DriverConfig,
}

impl<E: Environment> ServerDriver<E> {
    /// Create a new server driver.
    pub fn new(env: E, config: DriverConfig) -> Self {
        Self { registry: ConnectionRegistry::new(), rooms: RoomManager::new(), env, config }
    }

    /// Process a server event and return actions to execute.
    ///
    /// This is the main entry point for the server driver.
    pub fn process_event(&mut self, event: ServerEvent) -> Result<Actions<E::Instant>, DriverError> {
        match event {
            ServerEvent::ConnectionAccepted { session_id } => {
                self.handle_connection_accepted(session_id)
            },
            ServerEvent::FrameReceived { session_id, frame } => {
                self.handle_frame_received(session_id, &frame)
            },
            ServerEvent::ConnectionClosed { session_id, reason } => {
                Ok(self.handle_connection_closed(session_id, &reason))
            },
        }
    }

    fn handle_connection_accepted(
        &mut self,
        session_id: u64,
    ) -> Result<Actions<E::Instant>, DriverError> {
        if self.registry.session_count() >= self.config.max_connections {
            return Ok(vec![
                ServerAction::CloseConnection {
                    session_id,
                    reason: "max connections exceeded".to_string(),
                },
                self.log(LogLevel::Warn, format!("refused session {session_id}: server full")),
            ]);
        }

        if !self.registry.register_session(session_id) {
            return Err(DriverError::SessionAlreadyExists(session_id));
        }

        Ok(vec![self.log(LogLevel::Debug, format!("session {session_id} accepted"))])
    }

    fn handle_frame_received(
        &mut self,
        session_id: u64,
        frame: &Frame,
    ) -> Result<Actions<E::Instant>, DriverError> {
        if !self.registry.has_session(session_id) {
            return Err(DriverError::SessionNotFound(session_id));
        }

        let payload = match Payload::from_frame(frame) {
            Ok(payload) => payload,
            Err(e) => return Ok(self.reject_malformed(session_id, e.to_string())),
        };

        let result = match payload {
            Payload::CreateRoom(action::CreateRoom { name }) => self.create_room(session_id, name),
            Payload::JoinRoom(action::JoinRoom { name, code }) => {
                self.join_room(session_id, name, &code)
            },
            Payload::StartGame => self.start_game(session_id),
            Payload::ChooseStat(action::ChooseStat { metric }) => {
                self.choose_stat(session_id, &metric)
            },
            other => {
                let reason = format!("{:?} is not a client action", other.opcode());
                return Ok(self.reject_malformed(session_id, reason));
            },
        };

        Ok(result.unwrap_or_else(|e| self.reject(session_id, &e)))
    }

    fn handle_connection_closed(&mut self, session_id: u64, reason: &str) -> Actions<E::Instant> {
        let Some(info) = self.registry.unregister_session(session_id) else {
            return vec![self.log(
                LogLevel::Debug,
                format!("close for unknown session {session_id}: {reason}"),
            )];
        };

        let mut actions =
            vec![self.log(LogLevel::Debug, format!("session {session_id} closed: {reason}"))];
        if let Some(code) = info.room {
            actions.extend(self.leave_room(&code, session_id));
        }
        actions
    }

    fn create_room(
        &mut self,
        session_id: u64,
        name: String,
    ) -> Result<Actions<E::Instant>, GameError> {
        if self.registry.room_for_session(session_id).is_some() {
            return Err(GameError::AlreadySeated(session_id));
        }
        validate_name(&name)?;

        let (code, player_id) = self.rooms.create_room(session_id, name, &self.env);
        self.registry.subscribe(session_id, code.clone());

        let mut actions = vec![ServerAction::SendToSession {
            session_id,
            payload: Payload::RoomCreated(event::RoomCreated { code: code.to_string(), player_id }),
        }];
        actions.extend(self.lobby_update(&code));
        actions.push(self.log(LogLevel::Info, format!("room {code} created by session {session_id}")));
        Ok(actions)
    }

    fn join_room(
        &mut self,
        session_id: u64,
        name: String,
        code: &str,
    ) -> Result<Actions<E::Instant>, GameError> {
        if self.registry.room_for_session(session_id).is_some() {
            return Err(GameError::AlreadySeated(session_id));
        }

        validate_name(&name)?;

        let code: RoomCode = code.parse()?;
        let player_id = self.rooms.join_room(&code, session_id, name)?;
        self.registry.subscribe(session_id, code.clone());

        let mut actions = vec![ServerAction::SendToSession {
            session_id,
            payload: Payload::RoomJoined(event::RoomJoined { code: code.to_string(), player_id }),
        }];
        actions.extend(self.lobby_update(&code));
        actions.push(self.log(LogLevel::Info, format!("session {session_id} joined room {code}")));
        Ok(actions)
    }

    fn start_game(&mut self, session_id: u64) -> Result<Actions<E::Instant>, GameError> {
        let code = self.seated_room(session_id)?;

        let room = self.rooms.start_game(&code, session_id, &self.env)?;
        let started = Payload::GameStarted(event::GameStarted {
            players: players_view(room),
            current_player_id: room.current_player_id(),
        });
        let summary = format!(
            "room {code} started: {} players, {} cards",
            room.players().len(),
            room.dealt()
        );
        let turn = your_turn(room);
        let winner = room.winner();

        let mut actions = vec![self.broadcast(&code, started), self.log(LogLevel::Info, summary)];
        actions.extend(self.after_move(&code, turn, winner));
        Ok(actions)
    }

    fn choose_stat(
        &mut self,
        session_id: u64,
        metric: &str,
    ) -> Result<Actions<E::Instant>, GameError> {
        let code = self.seated_room(session_id)?;

        let outcome = self.rooms.choose_stat(&code, session_id, metric)?;
        let room =
            self.rooms.room(&code).ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let resolved = round_resolved(&outcome, room);
        let turn = your_turn(room);

        let summary = match outcome.round_winner {
            Some(winner) => format!("room {code}: {} won by {winner}", outcome.metric),
            None => format!("room {code}: {} tied, pot {}", outcome.metric, outcome.pot_size),
        };

        let mut actions = vec![self.broadcast(&code, resolved), self.log(LogLevel::Debug, summary)];
        actions.extend(self.after_move(&code, turn, outcome.game_winner));
        Ok(actions)
    }

    fn leave_room(&mut self, code: &RoomCode, session_id: u64) -> Actions<E::Instant> {
        let Some(departure) = self.rooms.remove_player(code, session_id) else {
            return Vec::new();
        };

        if departure.room_empty {
            self.registry.clear_room(code);
            return vec![self.log(LogLevel::Info, format!("room {code} closed: last player left"))];
        }

        let turn = departure.turn_passed_to.and_then(|_| self.rooms.room(code).and_then(your_turn));

        let mut actions: Actions<E::Instant> = self.lobby_update(code).into_iter().collect();
        actions.push(self.log(LogLevel::Info, format!("session {session_id} left room {code}")));
        actions.extend(self.after_move(code, turn, departure.game_winner));
        actions
    }

    /// Actions that follow a state change: the next chooser's prompt, or the
    /// end of the game.
    fn after_move(
        &mut self,
        code: &RoomCode,
        turn: Option<(PlayerId, Payload)>,
        game_winner: Option<PlayerId>,
    ) -> Actions<E::Instant> {
        if let Some(winner) = game_winner {
            return self.finish_game(code, winner);
        }

        turn.map(|(session_id, payload)| ServerAction::SendToSession { session_id, payload })
            .into_iter()
            .collect()
    }

    /// Announce the winner and tear the room down.
    fn finish_game(&mut self, code: &RoomCode, winner: PlayerId) -> Actions<E::Instant> {
        let winner_name = self
            .rooms
            .room(code)
            .and_then(|room| room.player(winner))
            .map(|p| p.name().to_string())
            .unwrap_or_default();

        let over = self.broadcast(
            code,
            Payload::GameOver(event::GameOver { winner_id: winner, winner_name: winner_name.clone() }),
        );

        self.rooms.remove_room(code);
        let released = self.registry.clear_room(code);

        vec![over, self.log(
            LogLevel::Info,
            format!(
                "room {code} finished: {winner_name} ({winner}) won, {} sessions released",
                released.len()
            ),
        )]
    }

    fn lobby_update(&self, code: &RoomCode) -> Option<ServerAction<E::Instant>> {
        let room = self.rooms.room(code)?;
        let payload = Payload::LobbyUpdated(event::LobbyUpdated {
            players: players_view(room),
            host_id: room.host_id(),
        });
        Some(self.broadcast(code, payload))
    }

    fn broadcast(&self, code: &RoomCode, payload: Payload) -> ServerAction<E::Instant> {
        ServerAction::BroadcastToRoom {
            room: code.clone(),
            sessions: self.registry.sessions_in_room(code).collect(),
            payload,
        }
    }

    fn seated_room(&self, session_id: u64) -> Result<RoomCode, GameError> {
        self.registry.room_for_session(session_id).cloned().ok_or(GameError::NotSeated)
    }

    fn reject(&self, session_id: u64, error: &GameError) -> Actions<E::Instant> {
        vec![
            ServerAction::SendToSession {
                session_id,
                payload: Payload::ActionRejected(rejection(error)),
            },
            self.log(LogLevel::Debug, format!("session {session_id} rejected: {error}")),
        ]
    }

    fn reject_malformed(&self, session_id: u64, reason: String) -> Actions<E::Instant> {
        let message = format!("session {session_id} sent a malformed action: {reason}");
        vec![
            ServerAction::SendToSession {
                session_id,
                payload: Payload::ActionRejected(RejectPayload::malformed(reason)),
            },
            self.log(LogLevel::Warn, message),
        ]
    }

    fn log(&self, level: LogLevel, message: String) -> ServerAction<E::Instant> {
        ServerAction::Log { level, message, timestamp: self.env.now() }
    }

    /// Number of registered sessions.
    pub fn connection_count(&self) -> usize {
        self.registry.session_count()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }

    /// Check if a room exists.
    pub fn has_room(&self, code: &RoomCode) -> bool {
        self.rooms.has_room(code)
    }

    /// Look up a live room.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.room(code)
    }

    /// Room a session is seated in.
    pub fn room_for_session(&self, session_id: u64) -> Option<&RoomCode> {
        self.registry.room_for_session(session_id)
    }

    /// All sessions seated in a room.
    pub fn sessions_in_room(&self, code: &RoomCode) -> impl Iterator<Item = u64> + '_ {
        self.registry.sessions_in_room(code)
    }

    /// All live rooms.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.rooms()
    }
}

impl<E: Environment> std::fmt::Debug for ServerDriver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDriver")
            .field("sessions", &self.registry.session_count())
            .field("rooms", &self.rooms.room_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Map a rule failure to its wire rejection.
fn rejection(error: &GameError) -> RejectPayload {
    let code = match error {
        GameError::RoomNotFound(_) => RejectPayload::ROOM_NOT_FOUND,
        GameError::RoomNotJoinable => RejectPayload::ROOM_NOT_JOINABLE,
        GameError::NotHost => RejectPayload::NOT_HOST,
        GameError::NotYourTurn => RejectPayload::NOT_YOUR_TURN,
        GameError::UnknownMetric(_) => RejectPayload::UNKNOWN_METRIC,
        GameError::WrongPhase(_) => RejectPayload::WRONG_PHASE,
        GameError::AlreadySeated(_) => RejectPayload::ALREADY_SEATED,
        GameError::NotSeated => RejectPayload::NOT_SEATED,
        GameError::EmptyDeck => RejectPayload::EMPTY_DECK,
        GameError::NameTooLong { .. } => RejectPayload::NAME_TOO_LONG,
    };
    RejectPayload::new(code, error.to_string())
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn card_view(card: &Card) -> CardView {
    let metrics = card.metrics();
    CardView {
        name: card.name().to_string(),
        image_ref: card.image_ref().to_string(),
        metrics: Metric::ALL
            .into_iter()
            .map(|m| (m.as_str().to_string(), metrics.get(m)))
            .collect(),
    }
}

fn player_view(player: &Player) -> PlayerView {
    PlayerView {
        id: player.id(),
        name: player.name().to_string(),
        hand_size: count(player.hand().len()),
        won_size: count(player.won_pile().len()),
    }
}

fn players_view(room: &Room) -> Vec<PlayerView> {
    room.players().iter().map(player_view).collect()
}

/// The current chooser and their prompt.
fn your_turn(room: &Room) -> Option<(PlayerId, Payload)> {
    let player = room.current_player()?;
    let card = player.top_card()?;
    Some((player.id(), Payload::YourTurn(event::YourTurn { card: card_view(card) })))
}

fn round_resolved(outcome: &RoundOutcome, room: &Room) -> Payload {
    Payload::RoundResolved(event::RoundResolved {
        metric: outcome.metric.as_str().to_string(),
        revealed: outcome
            .revealed
            .iter()
            .map(|r| RevealedCard { player_id: r.player_id, card: card_view(&r.card) })
            .collect(),
        tie: outcome.tie,
        round_winner: outcome.round_winner,
        pot_size: count(outcome.pot_size),
        current_player_id: outcome.current_player_id,
        players: players_view(room),
    })
}
