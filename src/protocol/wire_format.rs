//! Wire format encoding and decoding.
//!
//! Every frame on the translation stream starts with a 5-byte header:
//! ```text
//! ┌───────┬───────────┬──────────────────┐
//! │ Kind  │ Length    │ Payload          │
//! │ 1 byte│ 4 bytes   │ `Length` bytes   │
//! │       │ uint32 BE │                  │
//! └───────┴───────────┴──────────────────┘
//! ```
//!
//! Frames are concatenated back-to-back with no delimiter or padding.

/// Header size in bytes (fixed, exactly 5).
pub const HEADER_SIZE: usize = 5;

/// Frame kind codes understood by the client.
///
/// Any other value is reserved. Reserved frames are still framed by the
/// decoder, and ignored by the dispatcher.
pub mod kinds {
    /// Final result, payload is the encoded image.
    pub const RESULT: u8 = 0;
    /// Status update, payload is a UTF-8 status tag.
    pub const STATUS: u8 = 1;
    /// Producer-side error, payload is a UTF-8 diagnostic.
    pub const ERROR: u8 = 2;
    /// Queue position, payload is UTF-8 text (usually an integer).
    pub const QUEUE_POSITION: u8 = 3;
    /// Queue cleared, payload ignored.
    pub const QUEUE_CLEARED: u8 = 4;
}

/// Typed view of the recognised frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Final result image.
    Result,
    /// Pipeline status update.
    Status,
    /// Producer-side error.
    Error,
    /// Position in the processing queue.
    QueuePosition,
    /// Queue position no longer known.
    QueueCleared,
}

impl FrameKind {
    /// Map a raw kind byte, returning `None` for reserved values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            kinds::RESULT => Some(Self::Result),
            kinds::STATUS => Some(Self::Status),
            kinds::ERROR => Some(Self::Error),
            kinds::QUEUE_POSITION => Some(Self::QueuePosition),
            kinds::QUEUE_CLEARED => Some(Self::QueueCleared),
            _ => None,
        }
    }

    /// The raw kind byte.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Result => kinds::RESULT,
            Self::Status => kinds::STATUS,
            Self::Error => kinds::ERROR,
            Self::QueuePosition => kinds::QUEUE_POSITION,
            Self::QueueCleared => kinds::QUEUE_CLEARED,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Raw kind byte.
    pub kind: u8,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a new header.
    pub fn new(kind: u8, payload_length: u32) -> Self {
        Self {
            kind,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian length).
    ///
    /// # Example
    ///
    /// ```
    /// use imgtrans_client::protocol::{Header, kinds};
    ///
    /// let bytes = Header::new(kinds::STATUS, 3).encode();
    /// assert_eq!(bytes, [1, 0, 0, 0, 3]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = self.kind;
        buf[1..5].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes.
    ///
    /// Returns `None` if the buffer is shorter than [`HEADER_SIZE`].
    ///
    /// # Example
    ///
    /// ```
    /// use imgtrans_client::protocol::Header;
    ///
    /// let header = Header::decode(&[3, 0, 0, 1, 0]).unwrap();
    /// assert_eq!(header.kind, 3);
    /// assert_eq!(header.payload_length, 256);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            kind: buf[0],
            payload_length: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
        })
    }

    /// Total encoded size of the frame this header introduces.
    ///
    /// Saturates on targets where `usize` cannot hold the full length.
    #[inline]
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE.saturating_add(self.payload_length as usize)
    }

    /// Typed kind, `None` when reserved.
    #[inline]
    pub fn frame_kind(&self) -> Option<FrameKind> {
        FrameKind::from_u8(self.kind)
    }
}
