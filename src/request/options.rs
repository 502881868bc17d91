//! Translation options sent as the `config` part of the upload.
//!
//! The JSON shape matches what the translation service expects:
//!
//! ```json
//! {
//!   "detector": { "detector": "default", "detection_size": 1536,
//!                 "box_threshold": 0.7, "unclip_ratio": 2.3 },
//!   "render": { "direction": "auto" },
//!   "translator": { "translator": "youdao", "target_lang": "CHS" },
//!   "inpainter": { "inpainter": "default", "inpainting_size": 2048 },
//!   "mask_dilation_offset": 30
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use imgtrans_client::request::{Language, TranslateOptions, Translator};
//!
//! let mut options = TranslateOptions::default();
//! options.translator.translator = Translator::Deepl;
//! options.translator.target_lang = Language::Eng;
//!
//! let json = options.to_json().unwrap();
//! assert!(json.contains(r#""target_lang":"ENG""#));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, TranslateError};

/// Allowed values for `detector.detection_size`.
pub const DETECTION_SIZES: [u32; 4] = [1024, 1536, 2048, 2560];

/// Allowed values for `inpainter.inpainting_size`.
pub const INPAINTING_SIZES: [u32; 4] = [516, 1024, 2048, 2560];

/// Text detection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Detector {
    /// Service default.
    #[default]
    Default,
    /// Comic text detector.
    Ctd,
    /// PaddleOCR detector.
    Paddle,
}

/// Direction for rendering translated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Follow the source layout.
    #[default]
    Auto,
    /// Force horizontal text.
    Horizontal,
    /// Force vertical text.
    Vertical,
}

/// Inpainting model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inpainter {
    /// Service default.
    #[default]
    Default,
    /// LaMa large.
    LamaLarge,
    /// LaMa MPE.
    LamaMpe,
    /// Stable Diffusion.
    Sd,
    /// Skip inpainting.
    None,
    /// Keep the original image.
    Original,
}

macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $key:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $key)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = TranslateError;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| TranslateError::InvalidOption {
                        name: stringify!($name),
                        reason: format!("unknown value {:?}", s),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyed_enum! {
    /// Text translation backend.
    pub enum Translator {
        /// Youdao.
        Youdao => "youdao",
        /// Baidu.
        Baidu => "baidu",
        /// Google.
        Google => "google",
        /// DeepL.
        Deepl => "deepl",
        /// Papago.
        Papago => "papago",
        /// Caiyun.
        Caiyun => "caiyun",
        /// Sakura.
        Sakura => "sakura",
        /// GPT-3.
        Gpt3 => "gpt3",
        /// GPT-3.5.
        Gpt35 => "gpt3.5",
        /// GPT-4.
        Gpt4 => "gpt4",
        /// Offline model chosen by the service.
        Offline => "offline",
        /// NLLB.
        Nllb => "nllb",
        /// NLLB (large).
        NllbBig => "nllb_big",
        /// Sugoi.
        Sugoi => "sugoi",
        /// JParaCrawl.
        Jparacrawl => "jparacrawl",
        /// JParaCrawl (large).
        JparacrawlBig => "jparacrawl_big",
        /// M2M100.
        M2m100 => "m2m100",
        /// M2M100 (large).
        M2m100Big => "m2m100_big",
        /// Keep the original text.
        Original => "original",
        /// Remove text without translating.
        None => "none",
    }
}

impl Translator {
    /// Name shown to users.
    pub fn display_name(self) -> String {
        match self {
            Self::None => "No Text".to_string(),
            other => {
                let key = other.as_str();
                let mut chars = key.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::Youdao
    }
}

keyed_enum! {
    /// Target language code.
    pub enum Language {
        /// Simplified Chinese.
        Chs => "CHS",
        /// Traditional Chinese.
        Cht => "CHT",
        /// Japanese.
        Jpn => "JPN",
        /// English.
        Eng => "ENG",
        /// Korean.
        Kor => "KOR",
        /// Vietnamese.
        Vin => "VIN",
        /// Czech.
        Csy => "CSY",
        /// Dutch.
        Nld => "NLD",
        /// French.
        Fra => "FRA",
        /// German.
        Deu => "DEU",
        /// Hungarian.
        Hun => "HUN",
        /// Italian.
        Ita => "ITA",
        /// Polish.
        Plk => "PLK",
        /// Portuguese (Brazil).
        Ptb => "PTB",
        /// Romanian.
        Rom => "ROM",
        /// Russian.
        Rus => "RUS",
        /// Spanish.
        Esp => "ESP",
        /// Turkish.
        Trk => "TRK",
        /// Indonesian.
        Ind => "IND",
    }
}

impl Language {
    /// Native name of the language.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Chs => "简体中文",
            Self::Cht => "繁體中文",
            Self::Jpn => "日本語",
            Self::Eng => "English",
            Self::Kor => "한국어",
            Self::Vin => "Tiếng Việt",
            Self::Csy => "čeština",
            Self::Nld => "Nederlands",
            Self::Fra => "français",
            Self::Deu => "Deutsch",
            Self::Hun => "magyar nyelv",
            Self::Ita => "italiano",
            Self::Plk => "polski",
            Self::Ptb => "português",
            Self::Rom => "limba română",
            Self::Rus => "русский язык",
            Self::Esp => "español",
            Self::Trk => "Türk dili",
            Self::Ind => "Indonesia",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::Chs
    }
}

/// `detector` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorOptions {
    /// Detection model.
    pub detector: Detector,
    /// Resolution the image is scaled to for detection.
    pub detection_size: u32,
    /// Text box confidence threshold, in `[0, 1]`.
    pub box_threshold: f64,
    /// Box expansion ratio, must be positive.
    pub unclip_ratio: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            detector: Detector::Default,
            detection_size: 1536,
            box_threshold: 0.7,
            unclip_ratio: 2.3,
        }
    }
}

/// `render` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    /// Text direction.
    pub direction: TextDirection,
}

/// `translator` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslatorOptions {
    /// Translation backend.
    pub translator: Translator,
    /// Target language.
    pub target_lang: Language,
}

/// `inpainter` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InpainterOptions {
    /// Inpainting model.
    pub inpainter: Inpainter,
    /// Resolution used for inpainting.
    pub inpainting_size: u32,
}

impl Default for InpainterOptions {
    fn default() -> Self {
        Self {
            inpainter: Inpainter::Default,
            inpainting_size: 2048,
        }
    }
}

/// Full option set for one translation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateOptions {
    /// Text detection.
    pub detector: DetectorOptions,
    /// Rendering.
    pub render: RenderOptions,
    /// Translation.
    pub translator: TranslatorOptions,
    /// Inpainting.
    pub inpainter: InpainterOptions,
    /// Pixels added around the text mask.
    pub mask_dilation_offset: u32,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            detector: DetectorOptions::default(),
            render: RenderOptions::default(),
            translator: TranslatorOptions::default(),
            inpainter: InpainterOptions::default(),
            mask_dilation_offset: 30,
        }
    }
}

impl TranslateOptions {
    /// Check preset sizes and numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if !DETECTION_SIZES.contains(&self.detector.detection_size) {
            return Err(TranslateError::InvalidOption {
                name: "detector.detection_size",
                reason: format!(
                    "{} is not one of {:?}",
                    self.detector.detection_size, DETECTION_SIZES
                ),
            });
        }

        if !INPAINTING_SIZES.contains(&self.inpainter.inpainting_size) {
            return Err(TranslateError::InvalidOption {
                name: "inpainter.inpainting_size",
                reason: format!(
                    "{} is not one of {:?}",
                    self.inpainter.inpainting_size, INPAINTING_SIZES
                ),
            });
        }

        let threshold = self.detector.box_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(TranslateError::InvalidOption {
                name: "detector.box_threshold",
                reason: format!("{} is outside [0, 1]", threshold),
            });
        }

        let ratio = self.detector.unclip_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(TranslateError::InvalidOption {
                name: "detector.unclip_ratio",
                reason: format!("{} must be a positive number", ratio),
            });
        }

        Ok(())
    }

    /// Validate, then serialize to the JSON config blob.
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
