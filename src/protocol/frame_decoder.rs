//! Incremental frame decoder for the translation stream.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! A small state machine avoids re-parsing the header of a frame whose
//! payload is still arriving:
//! - `WaitingForHeader`: Need at least 5 bytes
//! - `WaitingForPayload`: Header parsed, need the rest of the frame
//!
//! The header bytes stay in the buffer until the whole frame is present, so
//! between calls the buffer holds either nothing or the prefix of exactly one
//! incomplete frame.
//!
//! # Example
//!
//! ```
//! use imgtrans_client::protocol::{build_frame, kinds, FrameDecoder};
//!
//! let mut decoder = FrameDecoder::new();
//! let bytes = build_frame(kinds::STATUS, b"ocr");
//!
//! // Data arrives in arbitrary chunks from the response body
//! assert!(decoder.feed(&bytes[..2]).is_empty());
//! let frames = decoder.feed(&bytes[2..]);
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].payload(), b"ocr");
//! ```

use bytes::BytesMut;

use super::wire_format::{Header, HEADER_SIZE};
use super::Frame;

/// Default initial buffer capacity (64KB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for a complete header (need 5 bytes).
    WaitingForHeader,
    /// Header parsed, waiting until the buffer holds the whole frame.
    WaitingForPayload { header: Header },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// The decoder does not interpret frame kinds or payloads and enforces no
/// length limit: a frame announcing a huge payload simply waits for more
/// bytes. Capping the total stream size is the caller's job.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Accumulated bytes from transport reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
}

impl FrameDecoder {
    /// Create a new decoder with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a new decoder with a custom initial buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::WaitingForHeader,
        }
    }

    /// Append a chunk and extract all complete frames, in arrival order.
    ///
    /// Returns an empty vector if the buffered bytes do not yet form a
    /// complete frame. Incomplete data is kept for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);
        self.drain()
    }

    /// Extract complete frames from already-buffered bytes.
    ///
    /// Always empty right after a [`feed`](Self::feed) call, since `feed`
    /// drains everything it can.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        frames
    }

    /// Try to extract a single frame from the buffer.
    fn try_extract_one(&mut self) -> Option<Frame> {
        let header = match self.state {
            State::WaitingForHeader => {
                let header = Header::decode(&self.buffer)?;
                self.state = State::WaitingForPayload { header };
                header
            }
            State::WaitingForPayload { header } => header,
        };

        if self.buffer.len() < header.frame_len() {
            return None;
        }

        // Header + payload leave the buffer together; payload is zero-copy
        let mut frame_bytes = self.buffer.split_to(header.frame_len());
        let payload = frame_bytes.split_off(HEADER_SIZE).freeze();

        self.state = State::WaitingForHeader;

        Some(Frame::new(header.kind, payload))
    }

    /// Get the number of buffered (not yet emitted) bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Total size of the frame currently being reassembled, once its
    /// header has arrived.
    pub fn pending_frame_len(&self) -> Option<usize> {
        match self.state {
            State::WaitingForHeader => None,
            State::WaitingForPayload { header } => Some(header.frame_len()),
        }
    }

    /// Discard buffered bytes and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
