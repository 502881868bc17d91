//! Error types for imgtrans-client.
//!
//! These cover API misuse and failures to build or send a request. How a
//! translation session ends (finished, server error, lost connection) is not
//! an `Error`: it is reported through [`SessionState`](crate::session::SessionState)
//! and [`SessionOutcome`](crate::session::SessionOutcome).

use thiserror::Error;

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// I/O error (reading the source image, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (request config blob).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error while building the client or request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A translation option is outside its allowed values.
    #[error("Invalid option {name}: {reason}")]
    InvalidOption {
        /// Option path, e.g. `detector.detection_size`.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The image MIME type is not accepted by the service.
    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    /// A background session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A submission was attempted on a session that is not idle.
    #[error("Session already has a submission in progress or completed; reset it first")]
    SessionBusy,
}

/// Result type alias using TranslateError.
pub type Result<T> = std::result::Result<T, TranslateError>;
