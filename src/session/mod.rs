//! Session module - lifecycle of one submitted image.
//!
//! - [`SessionState`] - observable status, queue position and result
//! - [`SessionController`] - feeds the decoder, applies events, decides when to stop

mod controller;
mod state;

pub use controller::{SessionConfig, SessionController, SessionOutcome, SessionPhase};
pub use state::SessionState;
