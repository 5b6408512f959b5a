//! Statwar game server.
//!
//! Hosts stat-comparison card games for clients connected over QUIC.
//!
//! # Architecture
//!
//! Game rules live in [`statwar_core`] and never see a socket. The
//! [`ServerDriver`] is the Sans-IO gateway: it turns connection events into
//! room operations and returns [`ServerAction`]s. [`Server`] owns the I/O and
//! executes those actions with Quinn and Tokio.
//!
//! All rooms sit behind one driver lock. Each event is processed and its
//! actions delivered before the lock is released, so events from different
//! clients are applied to a room one at a time and every client sees a room's
//! events in the order they happened.
//!
//! # Components
//!
//! - [`ServerDriver`]: session routing and room lifecycle (pure logic)
//! - [`RoomManager`]: live rooms by code
//! - [`ConnectionRegistry`]: session to room membership
//! - [`QuicTransport`]: QUIC endpoint
//! - [`SystemEnv`]: OS clock and entropy

#![forbid(unsafe_code)]

mod driver;
mod error;
mod registry;
mod room_manager;
mod server_error;
mod system_env;
mod transport;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

pub use driver::{DriverConfig, LogLevel, ServerAction, ServerDriver, ServerEvent};
pub use error::ServerError;
pub use registry::{ConnectionRegistry, SessionInfo};
pub use room_manager::RoomManager;
pub use server_error::DriverError;
use statwar_core::Environment;
use statwar_proto::{Frame, FrameHeader, Payload};
pub use system_env::SystemEnv;
use tokio::sync::{Mutex, RwLock};
pub use transport::{QuicConnection, QuicTransport};

type SharedDriver = Arc<Mutex<ServerDriver<SystemEnv>>>;

/// Per-connection I/O handles.
struct SharedState {
    /// Session ID to QUIC connection (for closing)
    connections: RwLock<HashMap<u64, QuicConnection>>,
    /// Session ID to its event stream. Every event for a client goes through
    /// this one stream, which keeps them ordered.
    outbound_streams: RwLock<HashMap<u64, Mutex<quinn::SendStream>>>,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:4433")
    pub bind_address: String,
    /// Path to TLS certificate (PEM format)
    pub cert_path: Option<String>,
    /// Path to TLS private key (PEM format)
    pub key_path: Option<String>,
    /// Driver limits
    pub driver: DriverConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4433".to_string(),
            cert_path: None,
            key_path: None,
            driver: DriverConfig::default(),
        }
    }
}

/// Production server.
pub struct Server {
    driver: ServerDriver<SystemEnv>,
    transport: QuicTransport,
    env: SystemEnv,
}

impl Server {
    /// Bind the QUIC endpoint and build the driver.
    ///
    /// # Errors
    ///
    /// Any error from [`QuicTransport::bind`].
    pub fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let env = SystemEnv::new();
        let driver = ServerDriver::new(env.clone(), config.driver);
        let transport = QuicTransport::bind(
            &config.bind_address,
            config.cert_path.as_deref(),
            config.key_path.as_deref(),
        )?;

        Ok(Self { driver, transport, env })
    }

    /// Accept connections until the endpoint closes.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` if the local address cannot be read.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(addr = %self.transport.local_addr()?, "server running");

        let driver: SharedDriver = Arc::new(Mutex::new(self.driver));
        let shared = Arc::new(SharedState {
            connections: RwLock::new(HashMap::new()),
            outbound_streams: RwLock::new(HashMap::new()),
        });

        loop {
            match self.transport.accept().await {
                Ok(Some(conn)) => {
                    let driver = Arc::clone(&driver);
                    let shared = Arc::clone(&shared);
                    let session_id = self.env.random_u64();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(session_id, conn, driver, shared).await {
                            tracing::warn!(session_id, error = %e, "connection ended with error");
                        }
                    });
                },
                Ok(None) => {
                    tracing::info!("endpoint closed, shutting down");
                    return Ok(());
                },
                Err(e) => tracing::debug!(error = %e, "handshake failed"),
            }
        }
    }

    /// Address the server is bound to.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` if the socket has gone away.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }
}

async fn handle_connection(
    session_id: u64,
    conn: QuicConnection,
    driver: SharedDriver,
    shared: Arc<SharedState>,
) -> Result<(), ServerError> {
    tracing::debug!(session_id, peer = %conn.remote_addr(), "connection accepted");

    let outbound = conn.open_uni().await?;
    shared.connections.write().await.insert(session_id, conn.clone());
    shared.outbound_streams.write().await.insert(session_id, Mutex::new(outbound));

    dispatch(&driver, &shared, ServerEvent::ConnectionAccepted { session_id }).await?;

    let reason = loop {
        match conn.accept_bi().await {
            Ok((send, recv)) => {
                let driver = Arc::clone(&driver);
                let shared = Arc::clone(&shared);

                tokio::spawn(async move {
                    // Clients never read from the bidirectional half
                    drop(send);
                    if let Err(e) = handle_stream(session_id, recv, &driver, &shared).await {
                        tracing::debug!(session_id, error = %e, "action stream ended");
                    }
                });
            },
            Err(e) => break e.to_string(),
        }
    };

    shared.connections.write().await.remove(&session_id);
    shared.outbound_streams.write().await.remove(&session_id);

    dispatch(&driver, &shared, ServerEvent::ConnectionClosed { session_id, reason }).await
}

/// Read action frames off one client stream.
async fn handle_stream(
    session_id: u64,
    mut recv: quinn::RecvStream,
    driver: &SharedDriver,
    shared: &SharedState,
) -> Result<(), ServerError> {
    let mut buf = vec![0u8; FrameHeader::SIZE];

    loop {
        buf.resize(FrameHeader::SIZE, 0);
        if let Err(e) = recv.read_exact(&mut buf).await {
            tracing::debug!(session_id, error = %e, "stream closed");
            return Ok(());
        }

        let payload_size = FrameHeader::from_bytes(&buf)?.payload_size() as usize;
        buf.resize(FrameHeader::SIZE + payload_size, 0);
        recv.read_exact(&mut buf[FrameHeader::SIZE..])
            .await
            .map_err(|e| ServerError::Transport(format!("payload read failed: {e}")))?;

        let frame = Frame::decode(&buf)?;
        match dispatch(driver, shared, ServerEvent::FrameReceived { session_id, frame }).await {
            Ok(()) => {},
            Err(ServerError::Driver(e)) => {
                tracing::warn!(session_id, error = %e, "frame dropped");
            },
            Err(e) => return Err(e),
        }
    }
}

/// Feed one event to the driver and deliver its actions under the same lock.
///
/// Writes happen while the lock is held, so a client that stops reading
/// stalls every room until QUIC flow control gives up on it. Per-room
/// ordering depends on this; a bounded per-session send queue would lift the
/// stall at the cost of a task per client.
async fn dispatch(
    driver: &SharedDriver,
    shared: &SharedState,
    event: ServerEvent,
) -> Result<(), ServerError> {
    let mut driver = driver.lock().await;
    let actions = driver.process_event(event)?;
    execute_actions(actions, shared).await;
    Ok(())
}

/// A driver action with its payload already framed.
#[derive(Debug, PartialEq)]
enum Outbound {
    Deliver { sessions: Vec<u64>, bytes: Vec<u8> },
    Close { session_id: u64, reason: String },
    Log { level: LogLevel, message: String },
}

/// Frame every payload in a batch.
///
/// A payload that cannot be encoded is logged and skipped; the rest of the
/// batch still goes out.
fn frame_actions(actions: Vec<ServerAction>) -> Vec<Outbound> {
    let mut outbound = Vec::with_capacity(actions.len());
    for action in actions {
        let (sessions, payload) = match action {
            ServerAction::SendToSession { session_id, payload } => (vec![session_id], payload),
            ServerAction::BroadcastToRoom { room, sessions, payload } => {
                tracing::trace!(%room, recipients = sessions.len(), "broadcast");
                (sessions, payload)
            },
            ServerAction::CloseConnection { session_id, reason } => {
                outbound.push(Outbound::Close { session_id, reason });
                continue;
            },
            ServerAction::Log { level, message, .. } => {
                outbound.push(Outbound::Log { level, message });
                continue;
            },
        };

        let opcode = payload.opcode();
        match encode(payload) {
            Ok(bytes) => outbound.push(Outbound::Deliver { sessions, bytes }),
            Err(e) => {
                tracing::error!(?opcode, ?sessions, error = %e, "dropping unencodable payload");
            },
        }
    }
    outbound
}

async fn execute_actions(actions: Vec<ServerAction>, shared: &SharedState) {
    for outbound in frame_actions(actions) {
        match outbound {
            Outbound::Deliver { sessions, bytes } => {
                for session_id in sessions {
                    send_to(shared, session_id, &bytes).await;
                }
            },

            Outbound::Close { session_id, reason } => {
                tracing::info!(session_id, %reason, "closing connection");
                if let Some(conn) = shared.connections.write().await.remove(&session_id) {
                    conn.close(0, &reason);
                }
            },

            Outbound::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{message}"),
                LogLevel::Info => tracing::info!("{message}"),
                LogLevel::Warn => tracing::warn!("{message}"),
                LogLevel::Error => tracing::error!("{message}"),
            },
        }
    }
}

fn encode(payload: Payload) -> Result<Vec<u8>, ServerError> {
    let opcode = payload.opcode();
    let frame = payload.into_frame(FrameHeader::new(opcode))?;
    let mut buf = Vec::with_capacity(frame.encoded_len());
    frame.encode(&mut buf)?;
    Ok(buf)
}

/// Write one encoded frame to a client. A dead stream only loses that
/// client's copy.
async fn send_to(shared: &SharedState, session_id: u64, bytes: &[u8]) {
    let streams = shared.outbound_streams.read().await;
    let Some(stream) = streams.get(&session_id) else {
        tracing::debug!(session_id, "no outbound stream");
        return;
    };

    if let Err(e) = stream.lock().await.write_all(bytes).await {
        tracing::warn!(session_id, error = %e, "write failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use statwar_proto::payloads::event::GameOver;

    use super::*;

    fn game_over(winner_name: String) -> Payload {
        Payload::GameOver(GameOver { winner_id: 1, winner_name })
    }

    #[test]
    fn oversized_payload_does_not_drop_the_rest_of_the_batch() {
        let room = "ABCD".parse().unwrap();
        let oversized = "x".repeat(FrameHeader::MAX_PAYLOAD_SIZE as usize + 1);
        let actions = vec![
            ServerAction::BroadcastToRoom {
                room,
                sessions: vec![1, 2],
                payload: game_over(oversized),
            },
            ServerAction::SendToSession { session_id: 2, payload: game_over("Bob".to_string()) },
            ServerAction::Log {
                level: LogLevel::Info,
                message: "done".to_string(),
                timestamp: Instant::now(),
            },
        ];

        let outbound = frame_actions(actions);

        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound[0], Outbound::Deliver {
            sessions: vec![2],
            bytes: encode(game_over("Bob".to_string())).unwrap(),
        });
        assert_eq!(outbound[1], Outbound::Log { level: LogLevel::Info, message: "done".to_string() });
    }

    #[test]
    fn close_keeps_its_place_in_the_batch() {
        let actions = vec![
            ServerAction::SendToSession { session_id: 7, payload: game_over("Ann".to_string()) },
            ServerAction::CloseConnection { session_id: 7, reason: "full".to_string() },
        ];

        let outbound = frame_actions(actions);

        assert!(matches!(outbound[0], Outbound::Deliver { .. }));
        assert_eq!(outbound[1], Outbound::Close { session_id: 7, reason: "full".to_string() });
    }
}
