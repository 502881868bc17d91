//! Session controller - one submit-and-stream lifecycle.
//!
//! ```text
//! Idle ──submit──> Uploading ──2xx──> Streaming ──result frame──> Finished
//!                      │                  │
//!                      │ non-2xx          │ error frame / error status
//!                      │ send error       │ stream ends or breaks
//!                      v                  v
//!                   Failed(kind) <────────┘
//! ```
//!
//! Finished and Failed are terminal; [`SessionController::reset`] returns to
//! Idle. Each chunk is decoded and dispatched synchronously, the only
//! suspension point is waiting for the next chunk.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use bytes::Bytes;
//! use futures_util::stream;
//! use imgtrans_client::protocol::{build_frame, kinds};
//! use imgtrans_client::session::{SessionConfig, SessionController, SessionOutcome};
//!
//! let mut body = build_frame(kinds::STATUS, b"ocr");
//! body.extend(build_frame(kinds::RESULT, b"png bytes"));
//! let chunks = vec![Ok::<_, std::io::Error>(Bytes::from(body))];
//!
//! let mut session = SessionController::new(SessionConfig::default());
//! let outcome = session.run_stream(stream::iter(chunks)).await.unwrap();
//!
//! assert!(matches!(outcome, SessionOutcome::Finished(image) if image == "png bytes"));
//! # }
//! ```

use std::fmt;

use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::watch;

use super::SessionState;
use crate::error::{Result, TranslateError};
use crate::event::{EventDispatcher, Failure, FailureKind, StatePatch, Status};
use crate::protocol::{FrameDecoder, DEFAULT_BUFFER_CAPACITY};
use crate::request::{ImageUpload, TranslateOptions};
use crate::transport::{ChunkReader, HttpTransport};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing submitted.
    Idle,
    /// Request sent, waiting for response headers.
    Uploading,
    /// Reading and decoding the response body.
    Streaming,
    /// Result received.
    Finished,
    /// Terminal failure.
    Failed(FailureKind),
}

impl SessionPhase {
    /// True for Finished and Failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed(_))
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The translated image.
    Finished(Bytes),
    /// The session failed.
    Failed(Failure),
}

/// Per-session limits.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Abort the stream once this many body bytes have been read.
    ///
    /// `None` means unbounded.
    pub max_stream_bytes: Option<u64>,
    /// Initial capacity of the frame decoder's buffer.
    pub initial_buffer_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_stream_bytes: None,
            initial_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Drives one translation job from upload to a terminal state.
///
/// Owns the frame decoder and session state exclusively; nothing here is
/// shared, so no locking is needed. Observers get snapshots through
/// [`subscribe`](Self::subscribe).
pub struct SessionController {
    config: SessionConfig,
    phase: SessionPhase,
    state: SessionState,
    upload: Option<ImageUpload>,
    decoder: FrameDecoder,
    dispatcher: EventDispatcher,
    updates: watch::Sender<SessionState>,
}

impl SessionController {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        let decoder = FrameDecoder::with_capacity(config.initial_buffer_capacity);
        let (updates, _) = watch::channel(SessionState::default());
        Self {
            config,
            phase: SessionPhase::Idle,
            state: SessionState::default(),
            upload: None,
            decoder,
            dispatcher: EventDispatcher::new(),
            updates,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Image submitted in this session, if any.
    pub fn upload(&self) -> Option<&ImageUpload> {
        self.upload.as_ref()
    }

    /// Receive a snapshot of the state after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Outcome, once the session is terminal.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.phase {
            SessionPhase::Finished => self.state.result().cloned().map(SessionOutcome::Finished),
            SessionPhase::Failed(_) => match self.state.status() {
                Some(Status::Failed(failure)) => Some(SessionOutcome::Failed(failure.clone())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Upload `upload` with `options` and stream the response to completion.
    ///
    /// Returns `Err` only for problems detected before anything is sent
    /// (invalid options, session not idle). Everything after that, including
    /// connection failures, ends up in the returned [`SessionOutcome`].
    pub async fn submit(
        &mut self,
        transport: &HttpTransport,
        upload: ImageUpload,
        options: &TranslateOptions,
    ) -> Result<SessionOutcome> {
        let config_json = options.to_json()?;
        self.begin_upload()?;

        let response = transport.open(&upload, config_json).await;
        self.upload = Some(upload);

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Translation request failed: {}", e);
                return Ok(self.fail(Failure::with_detail(
                    FailureKind::Disconnected,
                    e.to_string(),
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Terminal upload error; never reclassified as queued.
            tracing::warn!("Upload rejected with HTTP {}", status.as_u16());
            return Ok(self.fail(Failure::with_detail(
                FailureKind::Upload,
                format!("HTTP {}", status.as_u16()),
            )));
        }

        self.stream_body(ChunkReader::new(response.bytes_stream())).await
    }

    /// Decode and dispatch an already-open body stream.
    ///
    /// Accepts a session that is Idle or Uploading, for callers that bring
    /// their own transport.
    pub async fn run_stream<S, E>(&mut self, stream: S) -> Result<SessionOutcome>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        match self.phase {
            SessionPhase::Idle => self.begin_upload()?,
            SessionPhase::Uploading => {}
            _ => return Err(TranslateError::SessionBusy),
        }
        self.stream_body(ChunkReader::new(stream)).await
    }

    /// Return to Idle, discarding buffer, state and upload.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.state = SessionState::default();
        self.upload = None;
        self.decoder.clear();
        self.dispatcher = EventDispatcher::new();
        self.publish();
    }

    fn begin_upload(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Idle {
            return Err(TranslateError::SessionBusy);
        }
        self.phase = SessionPhase::Uploading;
        self.state.apply(StatePatch::status(Status::Upload));
        self.publish();
        Ok(())
    }

    async fn stream_body<S, E>(&mut self, mut reader: ChunkReader<S>) -> Result<SessionOutcome>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        self.phase = SessionPhase::Streaming;

        loop {
            let chunk = match reader.next_chunk().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    tracing::warn!("Response stream broke: {}", e);
                    return Ok(self.fail(Failure::with_detail(FailureKind::Disconnected, e)));
                }
                None => {
                    tracing::warn!(
                        bytes = reader.bytes_read(),
                        buffered = self.decoder.len(),
                        "Response stream ended before a result"
                    );
                    return Ok(self.fail(Failure::new(FailureKind::Disconnected)));
                }
            };

            if let Some(limit) = self.config.max_stream_bytes {
                if reader.bytes_read() > limit {
                    tracing::warn!(limit, "Response stream exceeded size limit");
                    return Ok(self.fail(Failure::with_detail(
                        FailureKind::Disconnected,
                        format!("response exceeded {} bytes", limit),
                    )));
                }
            }

            for frame in self.decoder.feed(&chunk) {
                if self.dispatcher.dispatch(&frame, &mut self.state).is_some() {
                    tracing::debug!(
                        kind = frame.kind,
                        len = frame.payload_len(),
                        status = %self.state.status().map(Status::as_tag).unwrap_or("-"),
                        "Applied frame"
                    );
                    self.publish();
                }
            }

            if let Some(outcome) = self.settle() {
                tracing::debug!(
                    bytes = reader.bytes_read(),
                    chunks = reader.chunks_read(),
                    "Session reached terminal state"
                );
                return Ok(outcome);
            }
        }
    }

    /// Move to a terminal phase if the state calls for it.
    fn settle(&mut self) -> Option<SessionOutcome> {
        if self.state.result().is_some() {
            self.phase = SessionPhase::Finished;
        } else if let Some(kind) = self.state.status().and_then(Status::failure_kind) {
            self.phase = SessionPhase::Failed(kind);
        }
        self.outcome()
    }

    fn fail(&mut self, failure: Failure) -> SessionOutcome {
        self.phase = SessionPhase::Failed(failure.kind);
        self.state.apply(StatePatch::status(Status::Failed(failure.clone())));
        self.publish();
        SessionOutcome::Failed(failure)
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Subscribers must not be left watching a session that will never end
        if matches!(self.phase, SessionPhase::Uploading | SessionPhase::Streaming) {
            tracing::debug!("Session dropped before reaching a terminal state");
            self.fail(Failure::with_detail(FailureKind::Disconnected, "aborted"));
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("buffered", &self.decoder.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, kinds};
    use futures_util::{stream, StreamExt};

    type Chunk = std::result::Result<Bytes, std::io::Error>;

    fn chunks(parts: &[&[u8]]) -> Vec<Chunk> {
        parts.iter().map(|p| Ok(Bytes::copy_from_slice(p))).collect()
    }

    #[tokio::test]
    async fn test_full_successful_session() {
        let mut body = Vec::new();
        for tag in ["pending", "detection", "ocr", "translating", "rendering", "finished"] {
            body.extend(build_frame(kinds::STATUS, tag.as_bytes()));
        }
        body.extend(build_frame(kinds::RESULT, b"PNGDATA"));

        let mut session = SessionController::new(SessionConfig::default());
        let outcome = session
            .run_stream(stream::iter(chunks(&[&body[..7], &body[7..]])))
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Finished(Bytes::from_static(b"PNGDATA")));
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(session.state().status(), None);
        assert_eq!(session.outcome(), Some(outcome));
    }

    #[tokio::test]
    async fn test_stream_end_without_result_is_disconnect() {
        let body = build_frame(kinds::STATUS, b"ocr");
        let mut session = SessionController::new(SessionConfig::default());

        let outcome = session
            .run_stream(stream::iter(chunks(&[&body])))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Failed(Failure::new(FailureKind::Disconnected))
        );
        assert_eq!(session.phase(), SessionPhase::Failed(FailureKind::Disconnected));
        assert!(session.state().is_error());
    }

    #[tokio::test]
    async fn test_read_error_is_disconnect() {
        let items: Vec<Chunk> = vec![
            Ok(Bytes::from(build_frame(kinds::STATUS, b"ocr"))),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer")),
        ];
        let mut session = SessionController::new(SessionConfig::default());

        let outcome = session.run_stream(stream::iter(items)).await.unwrap();

        match outcome {
            SessionOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Disconnected);
                assert!(failure.detail.unwrap().contains("reset by peer"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_tag_ends_session() {
        let mut body = build_frame(kinds::STATUS, b"translating");
        body.extend(build_frame(kinds::STATUS, b"error-translating"));
        body.extend(build_frame(kinds::RESULT, b"late"));
        let mut session = SessionController::new(SessionConfig::default());

        let outcome = session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Failed(Failure::new(FailureKind::Translating))
        );
        assert!(session.state().result().is_none());
    }

    #[tokio::test]
    async fn test_stops_reading_after_terminal_frame() {
        let items: Vec<Chunk> = vec![
            Ok(Bytes::from(build_frame(kinds::ERROR, b"boom"))),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "must not be read")),
        ];
        let mut session = SessionController::new(SessionConfig::default());

        let outcome = session.run_stream(stream::iter(items)).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Failed(Failure::new(FailureKind::Generic)));
    }

    #[tokio::test]
    async fn test_size_limit_aborts_stream() {
        let config = SessionConfig {
            max_stream_bytes: Some(16),
            ..SessionConfig::default()
        };
        let mut session = SessionController::new(config);
        // Announces 1000 bytes, producer keeps sending
        let header = [kinds::RESULT, 0, 0, 0x03, 0xE8];
        let filler = [0u8; 10];

        let outcome = session
            .run_stream(stream::iter(chunks(&[&header, &filler, &filler])))
            .await
            .unwrap();

        match outcome {
            SessionOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Disconnected);
                assert!(failure.detail.unwrap().contains("16 bytes"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_busy_session_rejects_new_stream() {
        let mut session = SessionController::new(SessionConfig::default());
        let body = build_frame(kinds::RESULT, b"x");
        session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();

        let err = session
            .run_stream(stream::iter(chunks(&[&body])))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::SessionBusy));
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mut session = SessionController::new(SessionConfig::default());
        // Leave a partial frame in the decoder
        let mut body = build_frame(kinds::QUEUE_POSITION, b"3");
        body.extend_from_slice(&[kinds::STATUS, 0]);
        session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();
        assert!(session.phase().is_terminal());

        session.reset();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.state(), &SessionState::default());
        assert!(session.upload().is_none());
        assert_eq!(session.outcome(), None);

        // Fresh stream decodes from a clean buffer
        let body = build_frame(kinds::RESULT, b"second");
        let outcome = session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();
        assert_eq!(outcome, SessionOutcome::Finished(Bytes::from_static(b"second")));
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_state() {
        let mut session = SessionController::new(SessionConfig::default());
        let updates = session.subscribe();

        let mut body = build_frame(kinds::QUEUE_POSITION, b"2");
        body.extend(build_frame(kinds::STATUS, b"error-too-large"));
        session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();

        let latest = updates.borrow().clone();
        assert_eq!(latest, *session.state());
        assert_eq!(
            latest.status().and_then(Status::failure_kind),
            Some(FailureKind::TooLarge)
        );
        // No longer queued
        assert_eq!(latest.queue_position(), None);
    }

    #[tokio::test]
    async fn test_dropped_mid_stream_publishes_disconnect() {
        use futures_util::FutureExt;

        let mut session = SessionController::new(SessionConfig::default());
        let updates = session.subscribe();

        let body = build_frame(kinds::QUEUE_POSITION, b"7");
        let stalled = stream::iter(chunks(&[&body])).chain(stream::pending());
        assert!(session.run_stream(stalled).now_or_never().is_none());

        assert_eq!(session.phase(), SessionPhase::Streaming);
        assert_eq!(updates.borrow().queue_position(), Some("7"));

        drop(session);

        let last = updates.borrow().clone();
        assert!(last.is_error());
        assert_eq!(
            last.status().and_then(Status::failure_kind),
            Some(FailureKind::Disconnected)
        );
        assert_eq!(last.queue_position(), None);
    }

    #[tokio::test]
    async fn test_drop_after_finish_keeps_result() {
        let mut session = SessionController::new(SessionConfig::default());
        let updates = session.subscribe();

        let body = build_frame(kinds::RESULT, b"png");
        session.run_stream(stream::iter(chunks(&[&body]))).await.unwrap();
        drop(session);

        let last = updates.borrow().clone();
        assert!(!last.is_error());
        assert_eq!(last.result().map(|r| r.as_ref()), Some(&b"png"[..]));
    }
}
