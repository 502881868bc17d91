//! Observable state of one translation session.

use bytes::Bytes;

use crate::event::{StatePatch, Status};

/// Status, queue position and result of the in-flight job.
///
/// Only the event dispatcher and the session controller mutate it. It is
/// frozen once a result is set or a failure status is reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    status: Option<Status>,
    queue_position: Option<String>,
    result: Option<Bytes>,
}

impl SessionState {
    /// Current status. `None` before submission and after the result arrives.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Queue position, present only while queued and known.
    pub fn queue_position(&self) -> Option<&str> {
        self.queue_position.as_deref()
    }

    /// Result image, set once on success.
    pub fn result(&self) -> Option<&Bytes> {
        self.result.as_ref()
    }

    /// True iff the status is a failure.
    pub fn is_error(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_error)
    }

    /// True once no further frame may change this state.
    pub fn is_frozen(&self) -> bool {
        self.result.is_some() || self.is_error()
    }

    /// Progress line for display. Empty when there is no status.
    pub fn status_text(&self) -> String {
        self.status
            .as_ref()
            .map(|s| s.description(self.queue_position()).into_owned())
            .unwrap_or_default()
    }

    pub(crate) fn apply(&mut self, patch: StatePatch) {
        patch.status.apply_to(&mut self.status);
        patch.queue_position.apply_to(&mut self.queue_position);
        patch.result.apply_to(&mut self.result);
    }
}
