//! Frame struct with typed accessors.
//!
//! Represents one complete frame from the translation stream.
//! Uses `bytes::Bytes` so result images are handed out without copying.
//!
//! # Example
//!
//! ```
//! use imgtrans_client::protocol::{Frame, FrameKind, kinds};
//! use bytes::Bytes;
//!
//! let frame = Frame::new(kinds::STATUS, Bytes::from_static(b"ocr"));
//!
//! assert_eq!(frame.frame_kind(), Some(FrameKind::Status));
//! assert_eq!(frame.payload(), b"ocr");
//! ```

use std::borrow::Cow;

use bytes::Bytes;

use super::wire_format::{FrameKind, Header, HEADER_SIZE};

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw kind byte (may be a reserved value).
    pub kind: u8,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from kind and payload.
    pub fn new(kind: u8, payload: Bytes) -> Self {
        Self { kind, payload }
    }

    /// Create a frame from raw bytes (copies data).
    pub fn from_parts(kind: u8, payload: &[u8]) -> Self {
        Self {
            kind,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Typed kind, `None` when the kind byte is reserved.
    #[inline]
    pub fn frame_kind(&self) -> Option<FrameKind> {
        FrameKind::from_u8(self.kind)
    }

    /// Payload as text. Invalid UTF-8 sequences become U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Header describing this frame on the wire.
    ///
    /// # Panics
    ///
    /// Panics if the payload is larger than `u32::MAX` bytes.
    pub fn header(&self) -> Header {
        let len = u32::try_from(self.payload.len()).expect("frame payload exceeds u32::MAX bytes");
        Header::new(self.kind, len)
    }
}

/// Build a complete frame as a single byte vector.
///
/// # Panics
///
/// Panics if `payload` is larger than `u32::MAX` bytes.
///
/// # Example
///
/// ```
/// use imgtrans_client::protocol::{build_frame, kinds};
///
/// let bytes = build_frame(kinds::QUEUE_POSITION, b"5");
/// assert_eq!(bytes, [3, 0, 0, 0, 1, b'5']);
/// ```
pub fn build_frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).expect("frame payload exceeds u32::MAX bytes");
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&Header::new(kind, len).encode());
    buf.extend_from_slice(payload);
    buf
}
