//! Frame interpretation and state patching.
//!
//! Each decoded [`Frame`] is classified into an [`Event`], which describes its
//! effect on the session as a [`StatePatch`]. The [`EventDispatcher`] applies
//! patches to a [`SessionState`] and enforces the terminal latch: once the
//! session has failed or received its result, later frames are discarded.
//!
//! | kind | event | effect |
//! |------|-------|--------|
//! | 0 | [`Event::Result`] | set result, clear status and queue position |
//! | 1 | [`Event::Status`] | set status; clear queue position unless pending |
//! | 2 | [`Event::Error`] | status = generic failure, clear queue position |
//! | 3 | [`Event::QueuePosition`] | status = pending, set queue position |
//! | 4 | [`Event::QueueCleared`] | status = pending, clear queue position |
//! | other | [`Event::Unrecognized`] | none |

use bytes::Bytes;

use super::status::{FailureKind, Status};
use crate::protocol::{Frame, FrameKind};
use crate::session::SessionState;

/// Typed interpretation of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Final result image (opaque, usually PNG).
    Result(Bytes),
    /// Pipeline status update.
    Status(Status),
    /// Server-side error with its diagnostic text.
    Error(String),
    /// Position in the queue, as sent by the server.
    QueuePosition(String),
    /// Queue position no longer known.
    QueueCleared,
    /// Reserved kind byte.
    Unrecognized(u8),
}

impl Event {
    /// Classify a frame. Text payloads are decoded lossily.
    pub fn from_frame(frame: &Frame) -> Self {
        match frame.frame_kind() {
            Some(FrameKind::Result) => Self::Result(frame.payload.clone()),
            Some(FrameKind::Status) => Self::Status(Status::parse(&frame.text())),
            Some(FrameKind::Error) => Self::Error(frame.text().into_owned()),
            Some(FrameKind::QueuePosition) => Self::QueuePosition(frame.text().into_owned()),
            Some(FrameKind::QueueCleared) => Self::QueueCleared,
            None => Self::Unrecognized(frame.kind),
        }
    }

    /// Describe this event's effect on the session.
    pub fn patch(&self) -> StatePatch {
        match self {
            Self::Result(image) => StatePatch {
                status: FieldUpdate::Clear,
                queue_position: FieldUpdate::Clear,
                result: FieldUpdate::Set(image.clone()),
            },
            Self::Status(status) => StatePatch::status(status.clone()),
            Self::Error(_) => StatePatch::status(Status::failed(FailureKind::Generic)),
            Self::QueuePosition(position) => StatePatch {
                status: FieldUpdate::Set(Status::Pending),
                queue_position: FieldUpdate::Set(position.clone()),
                ..StatePatch::default()
            },
            Self::QueueCleared => StatePatch {
                status: FieldUpdate::Set(Status::Pending),
                queue_position: FieldUpdate::Clear,
                ..StatePatch::default()
            },
            Self::Unrecognized(_) => StatePatch::default(),
        }
    }

    /// True if applying this event ends the session.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Result(_) | Self::Error(_) => true,
            Self::Status(status) => status.is_error(),
            _ => false,
        }
    }
}

/// Update to a single optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the field as it is.
    Keep,
    /// Replace the field's value.
    Set(T),
    /// Reset the field to `None`.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Apply the update to a slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *slot = Some(value),
            Self::Clear => *slot = None,
        }
    }

    /// True for [`FieldUpdate::Keep`].
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Keep
    }
}

/// Which session fields an event changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    /// Status update.
    pub status: FieldUpdate<Status>,
    /// Queue position update.
    pub queue_position: FieldUpdate<String>,
    /// Result image update.
    pub result: FieldUpdate<Bytes>,
}

impl StatePatch {
    /// Patch that sets the status.
    ///
    /// A queue position only makes sense while pending, so any other status
    /// clears it.
    pub fn status(status: Status) -> Self {
        let queue_position = if status == Status::Pending {
            FieldUpdate::Keep
        } else {
            FieldUpdate::Clear
        };
        Self {
            status: FieldUpdate::Set(status),
            queue_position,
            result: FieldUpdate::Keep,
        }
    }

    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_keep() && self.queue_position.is_keep() && self.result.is_keep()
    }
}

/// Applies frames to session state in arrival order.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    applied: u64,
    discarded: u64,
}

impl EventDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret `frame` and apply it to `state`.
    ///
    /// Returns the applied event, or `None` when the frame was discarded
    /// (session already terminal) or had a reserved kind.
    pub fn dispatch(&mut self, frame: &Frame, state: &mut SessionState) -> Option<Event> {
        if state.is_frozen() {
            self.discarded += 1;
            tracing::debug!(
                kind = frame.kind,
                len = frame.payload_len(),
                "Session already terminal, discarding frame"
            );
            return None;
        }

        let event = Event::from_frame(frame);
        match &event {
            Event::Unrecognized(kind) => {
                self.discarded += 1;
                tracing::debug!(kind, "Ignoring frame with reserved kind");
                return None;
            }
            Event::Error(diagnostic) => {
                tracing::error!("Translation failed on server: {}", diagnostic);
            }
            Event::Status(Status::Unknown(tag)) => {
                tracing::debug!("Unknown status tag: {}", tag);
            }
            _ => {}
        }

        state.apply(event.patch());
        self.applied += 1;
        Some(event)
    }

    /// Number of frames that changed state.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Number of frames ignored (reserved kind or after the terminal latch).
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::kinds;

    fn frame(kind: u8, payload: &[u8]) -> Frame {
        Frame::from_parts(kind, payload)
    }

    #[test]
    fn test_event_from_each_kind() {
        assert_eq!(
            Event::from_frame(&frame(kinds::RESULT, &[1, 2, 3])),
            Event::Result(Bytes::from_static(&[1, 2, 3]))
        );
        assert_eq!(
            Event::from_frame(&frame(kinds::STATUS, b"ocr")),
            Event::Status(Status::Ocr)
        );
        assert_eq!(
            Event::from_frame(&frame(kinds::ERROR, b"oops")),
            Event::Error("oops".to_string())
        );
        assert_eq!(
            Event::from_frame(&frame(kinds::QUEUE_POSITION, b"5")),
            Event::QueuePosition("5".to_string())
        );
        assert_eq!(
            Event::from_frame(&frame(kinds::QUEUE_CLEARED, b"ignored")),
            Event::QueueCleared
        );
        assert_eq!(Event::from_frame(&frame(7, b"")), Event::Unrecognized(7));
    }

    #[test]
    fn test_queue_position_sets_pending() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::QUEUE_POSITION, b"5"), &mut state);

        assert_eq!(state.status(), Some(&Status::Pending));
        assert_eq!(state.queue_position(), Some("5"));
    }

    #[test]
    fn test_queue_cleared_keeps_pending() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::QUEUE_POSITION, b"2"), &mut state);
        dispatcher.dispatch(&frame(kinds::QUEUE_CLEARED, b""), &mut state);

        assert_eq!(state.status(), Some(&Status::Pending));
        assert_eq!(state.queue_position(), None);
    }

    #[test]
    fn test_stage_status_clears_queue_position() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::QUEUE_POSITION, b"2"), &mut state);
        dispatcher.dispatch(&frame(kinds::STATUS, b"detection"), &mut state);

        assert_eq!(state.status(), Some(&Status::Detection));
        assert_eq!(state.queue_position(), None);
        assert_eq!(state.status_text(), "Detecting texts");
    }

    #[test]
    fn test_pending_status_keeps_queue_position() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::QUEUE_POSITION, b"4"), &mut state);
        dispatcher.dispatch(&frame(kinds::STATUS, b"pending"), &mut state);

        assert_eq!(state.queue_position(), Some("4"));
    }

    #[test]
    fn test_error_frame_clears_queue_position() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::QUEUE_POSITION, b"3"), &mut state);
        dispatcher.dispatch(&frame(kinds::ERROR, b"worker died"), &mut state);

        assert!(state.is_error());
        assert_eq!(state.queue_position(), None);
    }

    #[test]
    fn test_result_sets_image_and_clears_status() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::STATUS, b"finished"), &mut state);
        let event = dispatcher.dispatch(&frame(kinds::RESULT, &[0xAA, 0xBB, 0xCC]), &mut state);

        assert!(event.unwrap().is_terminal());
        assert_eq!(state.result().map(|r| &r[..]), Some(&[0xAA, 0xBB, 0xCC][..]));
        assert_eq!(state.status(), None);
        assert!(state.is_frozen());
    }

    #[test]
    fn test_error_frame_sets_generic_failure() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::ERROR, b"CUDA out of memory"), &mut state);

        assert!(state.is_error());
        assert_eq!(state.status(), Some(&Status::failed(FailureKind::Generic)));
    }

    #[test]
    fn test_terminal_latch_after_error() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::ERROR, b"oops"), &mut state);
        let frozen = state.clone();

        for late in [
            frame(kinds::STATUS, b"ocr"),
            frame(kinds::QUEUE_POSITION, b"1"),
            frame(kinds::QUEUE_CLEARED, b""),
            frame(kinds::RESULT, b"png"),
        ] {
            assert_eq!(dispatcher.dispatch(&late, &mut state), None);
        }

        assert_eq!(state, frozen);
        assert_eq!(dispatcher.applied(), 1);
        assert_eq!(dispatcher.discarded(), 4);
    }

    #[test]
    fn test_error_status_tag_latches() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::STATUS, b"error-lang"), &mut state);
        dispatcher.dispatch(&frame(kinds::STATUS, b"rendering"), &mut state);

        assert_eq!(
            state.status().and_then(Status::failure_kind),
            Some(FailureKind::UnsupportedLanguage)
        );
    }

    #[test]
    fn test_finished_status_does_not_latch() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::STATUS, b"finished"), &mut state);
        assert!(!state.is_frozen());

        dispatcher.dispatch(&frame(kinds::RESULT, b"png"), &mut state);
        assert!(state.result().is_some());
    }

    #[test]
    fn test_unrecognized_kind_changes_nothing() {
        let mut state = SessionState::default();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&frame(kinds::STATUS, b"detection"), &mut state);
        let before = state.clone();

        assert_eq!(dispatcher.dispatch(&frame(200, b"x"), &mut state), None);
        assert_eq!(state, before);

        // Stream continues normally afterwards
        dispatcher.dispatch(&frame(kinds::STATUS, b"ocr"), &mut state);
        assert_eq!(state.status(), Some(&Status::Ocr));
    }

    #[test]
    fn test_patch_for_unrecognized_is_empty() {
        assert!(Event::Unrecognized(9).patch().is_empty());
        assert!(!Event::QueueCleared.patch().is_empty());
    }

    #[test]
    fn test_field_update_apply() {
        let mut slot = Some(1);
        FieldUpdate::Keep.apply_to(&mut slot);
        assert_eq!(slot, Some(1));
        FieldUpdate::Set(2).apply_to(&mut slot);
        assert_eq!(slot, Some(2));
        FieldUpdate::Clear.apply_to(&mut slot);
        assert_eq!(slot, None);
    }
}
