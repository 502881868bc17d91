//! Transport module - getting bytes to and from the translation service.
//!
//! - [`HttpTransport`] - multipart upload, streamed response
//! - [`ChunkReader`] - pulls raw body chunks, no framing knowledge

mod http;
mod reader;

pub use http::{HttpTransport, TRANSLATE_STREAM_PATH};
pub use reader::ChunkReader;
