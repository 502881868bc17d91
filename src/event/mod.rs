//! Event module - interpreting decoded frames.
//!
//! - [`Status`] - closed set of pipeline status tags, with an unknown fallback
//! - [`Event`] - typed view of one frame
//! - [`EventDispatcher`] - applies events to session state with a terminal latch

mod dispatcher;
mod status;

pub use dispatcher::{Event, EventDispatcher, FieldUpdate, StatePatch};
pub use status::{Failure, FailureKind, Status};
