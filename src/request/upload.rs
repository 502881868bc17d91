//! Source image for a translation request.

use std::path::Path;

use bytes::Bytes;

use crate::error::{Result, TranslateError};

/// MIME types the translation service accepts.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/bmp", "image/webp"];

/// Map a file extension to an accepted MIME type.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// An image file ready to be sent as the `image` part of the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Bytes,
    file_name: String,
    mime: &'static str,
}

impl ImageUpload {
    /// Create an upload from in-memory bytes.
    ///
    /// Fails with [`TranslateError::UnsupportedImage`] unless `mime` is one of
    /// [`ACCEPTED_MIME_TYPES`].
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>, mime: &str) -> Result<Self> {
        let mime = ACCEPTED_MIME_TYPES
            .iter()
            .copied()
            .find(|accepted| accepted.eq_ignore_ascii_case(mime))
            .ok_or_else(|| TranslateError::UnsupportedImage(mime.to_string()))?;

        Ok(Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime,
        })
    }

    /// Read an image file, inferring the MIME type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let mime = mime_for_extension(ext)
            .ok_or_else(|| TranslateError::UnsupportedImage(format!("{}", path.display())))?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Self::new(bytes, file_name, mime)
    }

    /// Image bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// File name sent with the upload.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type sent with the upload.
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte image.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
