//! Statwar wire protocol.
//!
//! Every message on the wire is a [`Frame`]: a fixed 16-byte binary header
//! followed by a CBOR payload. The header carries the [`Opcode`] that selects
//! the payload type, so the server can reject unknown or server-only opcodes
//! before touching the payload bytes.
//!
//! # Components
//!
//! - [`FrameHeader`]: zero-copy header parsing and validation
//! - [`Frame`]: header + raw payload bytes, encode/decode
//! - [`Payload`]: typed client actions and server events

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod errors;
mod frame;
mod header;
mod opcode;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use opcode::Opcode;
pub use payloads::Payload;

/// ALPN protocol identifier negotiated during the QUIC handshake.
pub const ALPN_PROTOCOL: &[u8] = b"statwar";
