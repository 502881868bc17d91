//! Pipeline status tags.
//!
//! Status updates arrive as UTF-8 tags inside kind-1 frames. They are parsed
//! into a closed enum; tags this client does not know are kept verbatim in
//! [`Status::Unknown`] instead of failing the stream.
//!
//! # Example
//!
//! ```
//! use imgtrans_client::event::{FailureKind, Status};
//!
//! assert_eq!(Status::parse("mask-generation"), Status::MaskGeneration);
//! assert_eq!(Status::parse("error-lang").failure_kind(), Some(FailureKind::UnsupportedLanguage));
//! assert_eq!(Status::parse("colorizing"), Status::Unknown("colorizing".into()));
//! ```

use std::borrow::Cow;
use std::fmt;

/// Classification of a failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Unspecified failure (`error`, or an error frame from the server).
    Generic,
    /// Upload rejected (`error-upload`, or a non-success HTTP response).
    Upload,
    /// Target language not supported by the translator (`error-lang`).
    UnsupportedLanguage,
    /// Translation service returned no text (`error-translating`).
    Translating,
    /// Image larger than the service accepts (`error-too-large`).
    TooLarge,
    /// Connection lost before a result arrived (`error-disconnect`).
    Disconnected,
}

impl FailureKind {
    /// Wire tag for this failure.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Generic => "error",
            Self::Upload => "error-upload",
            Self::UnsupportedLanguage => "error-lang",
            Self::Translating => "error-translating",
            Self::TooLarge => "error-too-large",
            Self::Disconnected => "error-disconnect",
        }
    }

    /// Human-readable message for this failure.
    pub fn description(self) -> &'static str {
        match self {
            Self::Generic => "Something went wrong, please try again",
            Self::Upload => "Upload failed, please try again",
            Self::UnsupportedLanguage => {
                "Your target language is not supported by the chosen translator"
            }
            Self::Translating => "Did not get any text back from the text translation service",
            Self::TooLarge => "Image size too large (greater than 8000x8000 px)",
            Self::Disconnected => "Lost connection to server",
        }
    }
}

/// A terminal failure with optional client-side context.
///
/// `detail` holds context produced by this client (for example the HTTP
/// status of a rejected upload). Diagnostics sent by the server are logged
/// and never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// What went wrong.
    pub kind: FailureKind,
    /// Extra context, if any.
    pub detail: Option<String>,
}

impl Failure {
    /// Failure without detail.
    pub fn new(kind: FailureKind) -> Self {
        Self { kind, detail: None }
    }

    /// Failure with detail.
    pub fn with_detail(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({})", self.kind.as_tag(), detail),
            None => f.write_str(self.kind.as_tag()),
        }
    }
}

/// Session status as reported by the server (or set by the client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Image is being uploaded.
    Upload,
    /// Waiting in the queue, or queued processing.
    Pending,
    /// Detecting text regions.
    Detection,
    /// Running OCR.
    Ocr,
    /// Generating the text mask.
    MaskGeneration,
    /// Inpainting the original text away.
    Inpainting,
    /// Upscaling.
    Upscaling,
    /// Translating recognised text.
    Translating,
    /// Rendering translated text.
    Rendering,
    /// Pipeline done; the result frame follows.
    Finished,
    /// Terminal failure.
    Failed(Failure),
    /// Tag not known to this client.
    Unknown(String),
}

impl Status {
    /// Parse a wire tag. Never fails.
    ///
    /// Unknown tags starting with `error` are treated as a generic failure,
    /// any other unknown tag becomes [`Status::Unknown`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            "upload" => Self::Upload,
            "pending" => Self::Pending,
            "detection" => Self::Detection,
            "ocr" => Self::Ocr,
            "mask-generation" => Self::MaskGeneration,
            "inpainting" => Self::Inpainting,
            "upscaling" => Self::Upscaling,
            "translating" => Self::Translating,
            "rendering" => Self::Rendering,
            "finished" => Self::Finished,
            "error" => Self::failed(FailureKind::Generic),
            "error-upload" => Self::failed(FailureKind::Upload),
            "error-lang" => Self::failed(FailureKind::UnsupportedLanguage),
            "error-translating" => Self::failed(FailureKind::Translating),
            "error-too-large" => Self::failed(FailureKind::TooLarge),
            "error-disconnect" => Self::failed(FailureKind::Disconnected),
            other if other.starts_with("error") => Self::Failed(Failure::with_detail(
                FailureKind::Generic,
                other.to_string(),
            )),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Shorthand for a failure status without detail.
    pub fn failed(kind: FailureKind) -> Self {
        Self::Failed(Failure::new(kind))
    }

    /// Wire tag for this status.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Upload => "upload",
            Self::Pending => "pending",
            Self::Detection => "detection",
            Self::Ocr => "ocr",
            Self::MaskGeneration => "mask-generation",
            Self::Inpainting => "inpainting",
            Self::Upscaling => "upscaling",
            Self::Translating => "translating",
            Self::Rendering => "rendering",
            Self::Finished => "finished",
            Self::Failed(failure) => failure.kind.as_tag(),
            Self::Unknown(tag) => tag,
        }
    }

    /// True for any failure variant.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Failure classification, if this is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(failure) => Some(failure.kind),
            _ => None,
        }
    }

    /// Human-readable progress line.
    ///
    /// `queue_position` is only used for [`Status::Pending`]. Unknown tags
    /// have no description and yield an empty string.
    pub fn description(&self, queue_position: Option<&str>) -> Cow<'static, str> {
        let text = match self {
            Self::Upload => "Uploading",
            Self::Pending => match queue_position {
                Some(pos) => return Cow::Owned(format!("Queuing, your position is {}", pos)),
                None => "Processing",
            },
            Self::Detection => "Detecting texts",
            Self::Ocr => "Running OCR",
            Self::MaskGeneration => "Generating text mask",
            Self::Inpainting => "Running inpainting",
            Self::Upscaling => "Running upscaling",
            Self::Translating => "Translating",
            Self::Rendering => "Rendering translated texts",
            Self::Finished => "Downloading image",
            Self::Failed(failure) => failure.kind.description(),
            Self::Unknown(_) => "",
        };
        Cow::Borrowed(text)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl From<&str> for Status {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}
