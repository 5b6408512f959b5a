//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while framing or (de)serializing messages.
///
/// All of these are fatal for the frame they occur on. None of them affect
/// other connections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer shorter than a frame header
    #[error("frame too short: expected {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Required length
        expected: usize,
        /// Received length
        actual: usize,
    },

    /// Header does not start with the protocol magic
    #[error("invalid magic number")]
    InvalidMagic,

    /// Header version is not supported by this build
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// Payload exceeds [`crate::FrameHeader::MAX_PAYLOAD_SIZE`]
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Claimed or actual size
        size: usize,
        /// Protocol limit
        max: usize,
    },

    /// Fewer payload bytes than the header claims
    #[error("frame truncated: expected {expected} payload bytes, got {actual}")]
    FrameTruncated {
        /// Payload size from the header
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Opcode is not part of the protocol
    #[error("unknown opcode: {0:#06x}")]
    UnknownOpcode(u16),

    /// CBOR serialization failed
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode error: {0}")]
    CborDecode(String),
}
