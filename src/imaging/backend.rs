//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the compressor
//! consumes: encode (resize + re-encode to WebP) and size_of (measure an
//! encoded resource).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). The backend owns every
//! resource it produces; callers never delete intermediate attempts.

use super::media::{MediaType, OUTPUT_TYPE};
use super::params::EncodeParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A picked image, before any processing. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    path: PathBuf,
    media_type: MediaType,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, media_type: MediaType) -> Self {
        Self {
            path: path.into(),
            media_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The type the picker declared, not necessarily what the bytes contain.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }
}

/// Output of one encode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub path: PathBuf,
    pub media_type: MediaType,
}

impl EncodedImage {
    /// An encoded image in the standard output format.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            media_type: OUTPUT_TYPE,
        }
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can serve a rayon batch.
pub trait ImageBackend: Sync {
    /// Resize `params.source` to `params.width` and re-encode it as WebP at
    /// `params.quality`, producing a fresh resource.
    fn encode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError>;

    /// Byte size of an encoded resource.
    fn size_of(&self, image: &EncodedImage) -> Result<u64, BackendError>;
}
