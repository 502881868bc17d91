//! Request module - what gets uploaded with a translation job.
//!
//! - [`TranslateOptions`] - typed option set, serialized to the `config` JSON part
//! - [`ImageUpload`] - source image with a validated MIME type

mod options;
mod upload;

pub use options::{
    Detector, DetectorOptions, Inpainter, InpainterOptions, Language, RenderOptions,
    TextDirection, TranslateOptions, Translator, TranslatorOptions, DETECTION_SIZES,
    INPAINTING_SIZES,
};
pub use upload::{mime_for_extension, ImageUpload, ACCEPTED_MIME_TYPES};
