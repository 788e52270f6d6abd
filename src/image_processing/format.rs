use image::ImageFormat;
use std::path::Path;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::error::ConvertError;

/// Image formats this tool can decode and encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Codec {
    #[strum(to_string = "PNG")]
    Png,
    #[strum(to_string = "JPEG")]
    Jpeg,
    #[strum(to_string = "GIF")]
    Gif,
}

/// Recognized extension / format names. Adding a format means adding rows here.
const FORMAT_NAMES: &[(&str, Codec)] = &[
    ("png", Codec::Png),
    ("jpg", Codec::Jpeg),
    ("jpeg", Codec::Jpeg),
    ("gif", Codec::Gif),
];

impl Codec {
    /// Canonical extension, used when the target is not spelled by the user
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Png => "png",
            Codec::Jpeg => "jpeg",
            Codec::Gif => "gif",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Codec::Png => ImageFormat::Png,
            Codec::Jpeg => ImageFormat::Jpeg,
            Codec::Gif => ImageFormat::Gif,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        Codec::iter().find(|codec| codec.image_format() == format)
    }

    /// Case-insensitive lookup of an extension or format name (no dots)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        FORMAT_NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, codec)| *codec)
    }

    /// Comma-separated list of every accepted name, for messages
    pub fn supported_names() -> String {
        FORMAT_NAMES
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// How the decoder for an input file was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Extension,
    Content,
}

impl Detection {
    pub fn describe(&self) -> &'static str {
        match self {
            Detection::Extension => "file extension",
            Detection::Content => "file content",
        }
    }
}

/// Target codec plus the extension appended to output files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    pub codec: Codec,
    pub extension: String,
}

impl TargetFormat {
    /// Parse a user supplied format string. The extension keeps the user's
    /// spelling (case included) minus surrounding dots.
    pub fn parse(format: &str) -> Result<Self, ConvertError> {
        let extension = format.trim_matches('.');
        let codec = resolve_encoder(format)?;
        Ok(Self {
            codec,
            extension: extension.to_string(),
        })
    }

    pub fn canonical(codec: Codec) -> Self {
        Self {
            codec,
            extension: codec.extension().to_string(),
        }
    }
}

/// Map a `--format` value to the codec used for encoding
pub fn resolve_encoder(format: &str) -> Result<Codec, ConvertError> {
    let trimmed = format.trim_matches('.');
    Codec::from_name(trimmed).ok_or_else(|| ConvertError::unsupported_target(format))
}

/// Pick the decoder for `path`: extension first, then the leading bytes of
/// the file content.
pub fn resolve_decoder(path: &Path, content: &[u8]) -> Result<(Codec, Detection), ConvertError> {
    if let Some(codec) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Codec::from_name)
    {
        return Ok((codec, Detection::Extension));
    }

    sniff(content)
        .map(|codec| (codec, Detection::Content))
        .ok_or_else(|| ConvertError::unrecognized_input(path))
}

/// Magic-byte detection limited to the supported codecs
pub fn sniff(content: &[u8]) -> Option<Codec> {
    image::guess_format(content)
        .ok()
        .and_then(Codec::from_image_format)
}
