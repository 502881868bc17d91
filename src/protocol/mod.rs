//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the binary framing of the translation stream:
//! - 5-byte header encoding/decoding
//! - Incremental decoder for reassembling frames split across reads
//! - Frame struct with typed accessors

mod frame;
mod frame_decoder;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use frame_decoder::{FrameDecoder, DEFAULT_BUFFER_CAPACITY};
pub use wire_format::{kinds, FrameKind, Header, HEADER_SIZE};
