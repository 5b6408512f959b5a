//! Frame type combining header and payload.
//!
//! A `Frame` is the transport-layer packet: a 16-byte header followed by the
//! already-encoded CBOR payload. It is a pure data holder; see
//! [`Payload::into_frame`](crate::Payload::into_frame) and
//! [`Payload::from_frame`](crate::Payload::from_frame) for typed access.

use bytes::{BufMut, Bytes};

use crate::{
    FrameHeader,
    errors::{ProtocolError, Result},
};

/// Complete protocol frame.
///
/// Layout on the wire: `[FrameHeader: 16 bytes] + [payload: variable bytes]`
///
/// # Invariants
///
/// - `payload.len()` matches `header.payload_size()`. Enforced by
///   [`Frame::new`] and verified by [`Frame::decode`].
/// - `payload.len()` never exceeds [`FrameHeader::MAX_PAYLOAD_SIZE`] on the
///   wire. Oversized frames can be constructed but are rejected by
///   [`Frame::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header
    pub header: FrameHeader,

    /// Raw payload bytes (CBOR-encoded)
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame, setting the header's payload size from the payload.
    #[must_use]
    pub fn new(mut header: FrameHeader, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();

        // Lengths past u32::MAX saturate and are rejected by `encode`.
        let payload_len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
        header.payload_size = payload_len.to_be_bytes();

        Self { header, payload }
    }

    /// Total encoded length (header + payload).
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FrameHeader::SIZE + self.payload.len()
    }

    /// Encode frame into buffer.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::PayloadTooLarge` if the payload exceeds
    ///   `MAX_PAYLOAD_SIZE`
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        if self.payload.len() > FrameHeader::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
            });
        }

        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&self.payload);

        Ok(())
    }

    /// Decode frame from wire format.
    ///
    /// Only validates framing; the payload stays raw bytes. Trailing data
    /// after the claimed payload is ignored.
    ///
    /// # Errors
    ///
    /// - Any header validation error from [`FrameHeader::from_bytes`]
    /// - `ProtocolError::FrameTruncated` if fewer payload bytes than claimed
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(bytes)?;

        let payload_size = header.payload_size() as usize;
        let total_size = FrameHeader::SIZE + payload_size;

        let Some(payload) = bytes.get(FrameHeader::SIZE..total_size) else {
            return Err(ProtocolError::FrameTruncated {
                expected: payload_size,
                actual: bytes.len().saturating_sub(FrameHeader::SIZE),
            });
        };

        Ok(Self { header: *header, payload: Bytes::copy_from_slice(payload) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Opcode;

    #[test]
    fn new_sets_payload_size() {
        let frame = Frame::new(FrameHeader::new(Opcode::ChooseStat), vec![1, 2, 3]);
        assert_eq!(frame.header.payload_size(), 3);
        assert_eq!(frame.encoded_len(), FrameHeader::SIZE + 3);
    }

    #[test]
    fn encode_then_decode() {
        let frame = Frame::new(FrameHeader::new(Opcode::JoinRoom), Bytes::from_static(b"hello"));

        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), frame.encoded_len());

        let decoded = Frame::decode(&buf).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let frame = Frame::new(FrameHeader::new(Opcode::JoinRoom), vec![0u8; 10]);
        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();

        let result = Frame::decode(&buf[..buf.len() - 4]);
        assert!(matches!(result, Err(ProtocolError::FrameTruncated { expected: 10, actual: 6 })));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; FrameHeader::MAX_PAYLOAD_SIZE as usize + 1];
        let frame = Frame::new(FrameHeader::new(Opcode::CreateRoom), payload);

        let mut buf = Vec::new();
        assert!(matches!(frame.encode(&mut buf), Err(ProtocolError::PayloadTooLarge { .. })));
        assert!(buf.is_empty());
    }
}
