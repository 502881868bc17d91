//! Chunk reader over a streamed response body.
//!
//! Pulls raw byte chunks in arrival order and counts them. It knows nothing
//! about framing; the session controller feeds what it reads into the
//! frame decoder.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

/// Reads chunks from any `Stream` of byte results.
///
/// The stream is pinned on the heap, so bodies like
/// `reqwest::Response::bytes_stream()` can be passed directly.
pub struct ChunkReader<S> {
    inner: Pin<Box<S>>,
    bytes_read: u64,
    chunks_read: u64,
}

impl<S, E> ChunkReader<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    /// Wrap a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: Box::pin(stream),
            bytes_read: 0,
            chunks_read: 0,
        }
    }

    /// Wait for the next chunk.
    ///
    /// Returns `None` at end of stream. Read errors are rendered to text,
    /// since any of them ends the session the same way.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, String>> {
        match self.inner.next().await? {
            Ok(chunk) => {
                self.bytes_read += chunk.len() as u64;
                self.chunks_read += 1;
                Some(Ok(chunk))
            }
            Err(e) => Some(Err(e.to_string())),
        }
    }

    /// Total bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of chunks read so far.
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }
}

impl<S> fmt::Debug for ChunkReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkReader")
            .field("bytes_read", &self.bytes_read)
            .field("chunks_read", &self.chunks_read)
            .finish_non_exhaustive()
    }
}
