//! CBOR-encoded protocol messages.
//!
//! Frame headers are raw binary, payloads are CBOR. The payload type is
//! determined by the `Opcode` in the frame header, so only the inner struct is
//! serialized (no variant tag). A frame whose opcode and payload disagree
//! fails to decode instead of being misinterpreted.
//!
//! # Invariants
//!
//! Each payload variant maps to exactly one opcode (enforced by match
//! exhaustiveness).

pub mod action;
pub mod event;

use bytes::BufMut;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Frame, FrameHeader, Opcode,
    errors::{ProtocolError, Result},
};

/// All possible frame payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    // Client actions
    /// Open a room
    CreateRoom(action::CreateRoom),
    /// Join a room
    JoinRoom(action::JoinRoom),
    /// Start the game (host only)
    StartGame,
    /// Choose the round metric (current player only)
    ChooseStat(action::ChooseStat),

    // Server events
    /// Room created
    RoomCreated(event::RoomCreated),
    /// Room joined
    RoomJoined(event::RoomJoined),
    /// Lobby roster changed
    LobbyUpdated(event::LobbyUpdated),
    /// Game started
    GameStarted(event::GameStarted),
    /// Recipient chooses next
    YourTurn(event::YourTurn),
    /// Round outcome
    RoundResolved(event::RoundResolved),
    /// Game finished
    GameOver(event::GameOver),
    /// Last action rejected
    ActionRejected(RejectPayload),
}

/// Rejection sent to the client whose action failed a precondition.
///
/// Rejections are client-scoped: the room is unchanged and no other player
/// is notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectPayload {
    /// Stable machine-readable code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl RejectPayload {
    /// Frame could not be decoded or carried a server-only opcode.
    pub const MALFORMED_ACTION: u16 = 0x0001;
    /// No live room with that code.
    pub const ROOM_NOT_FOUND: u16 = 0x0002;
    /// Room exists but is past its lobby.
    pub const ROOM_NOT_JOINABLE: u16 = 0x0003;
    /// Only the host may start the game.
    pub const NOT_HOST: u16 = 0x0004;
    /// Only the current player may choose the metric.
    pub const NOT_YOUR_TURN: u16 = 0x0005;
    /// Metric name not recognized.
    pub const UNKNOWN_METRIC: u16 = 0x0006;
    /// Action not valid in the room's current phase.
    pub const WRONG_PHASE: u16 = 0x0007;
    /// Sender already sits in a room.
    pub const ALREADY_SEATED: u16 = 0x0008;
    /// Game cannot start without cards.
    pub const EMPTY_DECK: u16 = 0x0009;
    /// Sender is not seated in any room.
    pub const NOT_SEATED: u16 = 0x000A;
    /// Display name is longer than the server accepts.
    pub const NAME_TOO_LONG: u16 = 0x000B;

    /// Create a rejection with the given code.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self { code, reason: reason.into() }
    }

    /// Create a malformed-action rejection.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(Self::MALFORMED_ACTION, reason)
    }
}

fn cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::de::from_reader(bytes).map_err(|e| ProtocolError::CborDecode(e.to_string()))
}

impl Payload {
    /// Opcode corresponding to this payload type.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::CreateRoom(_) => Opcode::CreateRoom,
            Self::JoinRoom(_) => Opcode::JoinRoom,
            Self::StartGame => Opcode::StartGame,
            Self::ChooseStat(_) => Opcode::ChooseStat,
            Self::RoomCreated(_) => Opcode::RoomCreated,
            Self::RoomJoined(_) => Opcode::RoomJoined,
            Self::LobbyUpdated(_) => Opcode::LobbyUpdated,
            Self::GameStarted(_) => Opcode::GameStarted,
            Self::YourTurn(_) => Opcode::YourTurn,
            Self::RoundResolved(_) => Opcode::RoundResolved,
            Self::GameOver(_) => Opcode::GameOver,
            Self::ActionRejected(_) => Opcode::ActionRejected,
        }
    }

    /// Encode payload to buffer.
    ///
    /// Serializes only the inner struct, not the variant tag. Does not check
    /// the size limit; that happens in [`Frame::encode`].
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let mut writer = dst.writer();

        match self {
            Self::CreateRoom(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::JoinRoom(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::StartGame => Ok(()), // Zero-byte payload
            Self::ChooseStat(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::RoomCreated(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::RoomJoined(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::LobbyUpdated(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::GameStarted(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::YourTurn(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::RoundResolved(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::GameOver(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::ActionRejected(inner) => ciborium::ser::into_writer(inner, &mut writer),
        }
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))
    }

    /// Decode payload from bytes based on opcode.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::PayloadTooLarge` if bytes exceed `MAX_PAYLOAD_SIZE`
    /// - `ProtocolError::CborDecode` if CBOR deserialization fails
    pub fn decode(opcode: Opcode, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > FrameHeader::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: bytes.len(),
                max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
            });
        }

        let payload = match opcode {
            Opcode::CreateRoom => Self::CreateRoom(cbor(bytes)?),
            Opcode::JoinRoom => Self::JoinRoom(cbor(bytes)?),
            Opcode::StartGame => Self::StartGame,
            Opcode::ChooseStat => Self::ChooseStat(cbor(bytes)?),
            Opcode::RoomCreated => Self::RoomCreated(cbor(bytes)?),
            Opcode::RoomJoined => Self::RoomJoined(cbor(bytes)?),
            Opcode::LobbyUpdated => Self::LobbyUpdated(cbor(bytes)?),
            Opcode::GameStarted => Self::GameStarted(cbor(bytes)?),
            Opcode::YourTurn => Self::YourTurn(cbor(bytes)?),
            Opcode::RoundResolved => Self::RoundResolved(cbor(bytes)?),
            Opcode::GameOver => Self::GameOver(cbor(bytes)?),
            Opcode::ActionRejected => Self::ActionRejected(cbor(bytes)?),
        };

        Ok(payload)
    }

    /// Convert payload into a transport frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn into_frame(self, mut header: FrameHeader) -> Result<Frame> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        header.opcode = self.opcode().to_u16().to_be_bytes();
        Ok(Frame::new(header, buf))
    }

    /// Parse payload from a raw transport frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownOpcode` if the header opcode is not recognized
    /// - `ProtocolError::CborDecode` if CBOR deserialization fails
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let opcode = frame
            .header
            .opcode_enum()
            .ok_or(ProtocolError::UnknownOpcode(frame.header.opcode()))?;
        Self::decode(opcode, &frame.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_game_is_empty() {
        let frame = Payload::StartGame.into_frame(FrameHeader::new(Opcode::StartGame)).unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(Payload::from_frame(&frame).unwrap(), Payload::StartGame);
    }

    #[test]
    fn into_frame_overwrites_header_opcode() {
        let payload = Payload::ChooseStat(action::ChooseStat { metric: "speed".to_string() });
        let frame = payload.clone().into_frame(FrameHeader::new(Opcode::StartGame)).unwrap();

        assert_eq!(frame.header.opcode_enum(), Some(Opcode::ChooseStat));
        assert_eq!(Payload::from_frame(&frame).unwrap(), payload);
    }

    #[test]
    fn rejection_round_trip() {
        let payload = Payload::ActionRejected(RejectPayload::new(
            RejectPayload::NOT_YOUR_TURN,
            "not your turn",
        ));
        let frame = payload.clone().into_frame(FrameHeader::new(Opcode::ActionRejected)).unwrap();
        assert_eq!(Payload::from_frame(&frame).unwrap(), payload);
    }

    #[test]
    fn mismatched_payload_fails_to_decode() {
        // JoinRoom bytes under a ChooseStat opcode: missing `metric` field
        let join = Payload::JoinRoom(action::JoinRoom {
            name: "ana".to_string(),
            code: "AB12".to_string(),
        });
        let mut frame = join.into_frame(FrameHeader::new(Opcode::JoinRoom)).unwrap();
        frame.header.opcode = Opcode::ChooseStat.to_u16().to_be_bytes();

        assert!(matches!(Payload::from_frame(&frame), Err(ProtocolError::CborDecode(_))));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let mut frame = Payload::StartGame.into_frame(FrameHeader::new(Opcode::StartGame)).unwrap();
        frame.header.opcode = 0x0999u16.to_be_bytes();

        assert!(matches!(Payload::from_frame(&frame), Err(ProtocolError::UnknownOpcode(0x0999))));
    }

    #[test]
    fn optional_fields_decode_when_absent() {
        let payload = Payload::RoundResolved(event::RoundResolved {
            metric: "attack".to_string(),
            revealed: Vec::new(),
            tie: true,
            round_winner: None,
            pot_size: 2,
            current_player_id: None,
            players: Vec::new(),
        });
        let frame = payload.clone().into_frame(FrameHeader::new(Opcode::RoundResolved)).unwrap();
        assert_eq!(Payload::from_frame(&frame).unwrap(), payload);
    }
}
