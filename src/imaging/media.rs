//! Media types of images entering and leaving the compressor.
//!
//! Inputs carry a *declared* type (from the picker), which is checked against
//! [`ACCEPTED_INPUTS`] before any pixel work. Every output is [`OUTPUT_TYPE`].

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Jpeg,
    Png,
    WebP,
    /// Anything else, kept as the raw MIME string (or `application/octet-stream`).
    Other(String),
}

/// Media types the compressor will take as input.
pub const ACCEPTED_INPUTS: &[MediaType] = &[MediaType::Jpeg, MediaType::Png];

/// The single standardized output format.
pub const OUTPUT_TYPE: MediaType = MediaType::WebP;

/// Extension → media type for the formats we know by name.
const EXTENSIONS: &[(&str, MediaType)] = &[
    ("jpg", MediaType::Jpeg),
    ("jpeg", MediaType::Jpeg),
    ("png", MediaType::Png),
    ("webp", MediaType::WebP),
];

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/webp" => Self::WebP,
            other => Self::Other(other.to_string()),
        }
    }

    /// Declared type from the file extension. Unknown extensions map to
    /// `Other` with a best-effort `image/<ext>` string.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, media)| media.clone())
            .unwrap_or_else(|| {
                if ext.is_empty() {
                    Self::Other("application/octet-stream".to_string())
                } else {
                    Self::Other(format!("image/{ext}"))
                }
            })
    }

    pub fn mime(&self) -> &str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Other(mime) => mime,
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("jpg"),
            Self::Png => Some("png"),
            Self::WebP => Some("webp"),
            Self::Other(_) => None,
        }
    }

    pub fn is_accepted_input(&self) -> bool {
        ACCEPTED_INPUTS.contains(self)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mime())
    }
}
