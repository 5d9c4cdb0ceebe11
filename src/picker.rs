//! Image picking: where [`SourceImage`]s come from.
//!
//! A picker hands back a source image with a *declared* media type, or
//! `None` when the user backs out. [`pick_and_compress`] is the whole
//! pick → compress flow; a cancelled pick never reaches the compressor.
//!
//! The CLI uses [`PathPicker`], which declares the type from the file
//! extension the way a mobile picker reports a MIME type alongside the URI.

use crate::imaging::{
    CompressConfig, CompressError, CompressedImage, ImageBackend, MediaType, SourceImage,
    compress_to_budget,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Picked file not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Compress(#[from] CompressError),
}

pub trait ImagePicker {
    /// `Ok(None)` means the pick was cancelled.
    fn pick_image(&self) -> Result<Option<SourceImage>, PickError>;
}

/// Picks a single file from disk.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: PathBuf,
    media_type: Option<MediaType>,
}

impl PathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            media_type: None,
        }
    }

    /// Declare the media type explicitly instead of inferring it.
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImagePicker for PathPicker {
    fn pick_image(&self) -> Result<Option<SourceImage>, PickError> {
        if !self.path.exists() {
            return Err(PickError::NotFound(self.path.clone()));
        }
        if !self.path.is_file() {
            return Err(PickError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", self.path.display()),
            )));
        }
        let media_type = self
            .media_type
            .clone()
            .unwrap_or_else(|| MediaType::from_path(&self.path));
        Ok(Some(SourceImage::new(self.path.clone(), media_type)))
    }
}

/// Pick an image and compress it. `Ok(None)` when the pick was cancelled.
pub fn pick_and_compress(
    picker: &impl ImagePicker,
    backend: &impl ImageBackend,
    config: &CompressConfig,
) -> Result<Option<CompressedImage>, PickError> {
    let Some(source) = picker.pick_image()? else {
        return Ok(None);
    };
    Ok(Some(compress_to_budget(backend, &source, config)?))
}
