//! Frame header implementation with zero-copy parsing.
//!
//! The `FrameHeader` is a fixed 16-byte structure serialized as raw binary
//! (Big Endian). The server reads exactly one header, validates it, and then
//! knows how many payload bytes follow.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    Opcode,
    errors::{ProtocolError, Result},
};

/// Fixed 16-byte frame header (Big Endian network byte order)
///
/// Fields are stored as raw byte arrays to avoid alignment issues, so every
/// 16-byte pattern is a valid value and casting untrusted network bytes is
/// safe. Semantic validation (magic, version, size limit) happens in
/// [`FrameHeader::from_bytes`].
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    magic: [u8; 4],                   // 0x53545752 ("STWR")
    version: u8,                      // 0x01
    reserved: u8,                     // must be zero
    pub(crate) opcode: [u8; 2],       // u16 operation code
    request_id: [u8; 4],              // u32 client nonce, echoed in replies
    pub(crate) payload_size: [u8; 4], // u32 payload length
}

impl FrameHeader {
    /// Size of the serialized header (16 bytes)
    pub const SIZE: usize = 16;

    /// Magic number: "STWR" in ASCII
    pub const MAGIC: u32 = 0x5354_5752;

    /// Current protocol version
    pub const VERSION: u8 = 0x01;

    /// Maximum payload size (64 KiB). Game messages are small; anything
    /// larger is a broken or hostile peer.
    pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024;

    /// Create a new header with the specified opcode.
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            magic: Self::MAGIC.to_be_bytes(),
            version: Self::VERSION,
            reserved: 0,
            opcode: opcode.to_u16().to_be_bytes(),
            request_id: [0; 4],
            payload_size: [0; 4],
        }
    }

    /// Parse header from network bytes (zero-copy)
    ///
    /// Trailing bytes after the header are ignored.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` if the buffer is under 16 bytes
    /// - `ProtocolError::InvalidMagic` if the magic number is wrong
    /// - `ProtocolError::UnsupportedVersion` for any other version
    /// - `ProtocolError::PayloadTooLarge` if the claimed size exceeds the limit
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let (header, _) = Self::ref_from_prefix(bytes).map_err(|_| {
            ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() }
        })?;

        if u32::from_be_bytes(header.magic) != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic);
        }

        if header.version != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version));
        }

        let payload_size = u32::from_be_bytes(header.payload_size);
        if payload_size > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_size as usize,
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(header)
    }

    /// Serialize header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Protocol version byte.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Operation code as raw u16.
    #[must_use]
    pub fn opcode(&self) -> u16 {
        u16::from_be_bytes(self.opcode)
    }

    /// Operation code as enum. `None` if unrecognized.
    #[must_use]
    pub fn opcode_enum(&self) -> Option<Opcode> {
        Opcode::from_u16(self.opcode())
    }

    /// Client-assigned nonce for request/response correlation.
    #[must_use]
    pub fn request_id(&self) -> u32 {
        u32::from_be_bytes(self.request_id)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        u32::from_be_bytes(self.payload_size)
    }

    /// Set the request nonce.
    pub fn set_request_id(&mut self, request_id: u32) {
        self.request_id = request_id.to_be_bytes();
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("version", &self.version())
            .field("opcode", &format_args!("{:#06x}", self.opcode()))
            .field("request_id", &self.request_id())
            .field("payload_size", &self.payload_size())
            .finish()
    }
}

impl PartialEq for FrameHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FrameHeader {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<FrameHeader>(), FrameHeader::SIZE);
    }

    #[test]
    fn new_header_round_trips() {
        let mut header = FrameHeader::new(Opcode::ChooseStat);
        header.set_request_id(7);

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"STWR");

        let parsed = FrameHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.opcode_enum(), Some(Opcode::ChooseStat));
        assert_eq!(parsed.request_id(), 7);
        assert_eq!(parsed.payload_size(), 0);
    }

    #[test]
    fn rejects_short_buffer() {
        let result = FrameHeader::from_bytes(&[0u8; 10]);
        assert!(matches!(result, Err(ProtocolError::FrameTooShort { expected: 16, actual: 10 })));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = FrameHeader::new(Opcode::StartGame).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(FrameHeader::from_bytes(&bytes), Err(ProtocolError::InvalidMagic)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = FrameHeader::new(Opcode::StartGame).to_bytes();
        bytes[4] = 0x09;
        assert!(matches!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::UnsupportedVersion(0x09))
        ));
    }

    #[test]
    fn rejects_oversized_payload_claim() {
        let mut bytes = FrameHeader::new(Opcode::CreateRoom).to_bytes();
        bytes[12..16].copy_from_slice(&(FrameHeader::MAX_PAYLOAD_SIZE + 1).to_be_bytes());
        assert!(matches!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }
}
