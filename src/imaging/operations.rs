//! High-level image operations.
//!
//! [`compress_to_budget`] is the adaptive compressor: it walks the quality
//! schedule from [`calculations`](super::calculations), calls the backend once
//! per level, and stops at the first candidate that fits the budget.
//!
//! Each attempt feeds on the previous attempt's output, not the original.
//! From the second attempt on the resize is a no-op in pixel terms, but the
//! image is still decoded and re-encoded, so losses compound. Which
//! (quality, size) pairs are reachable depends on this chaining.

use super::backend::{BackendError, EncodedImage, ImageBackend, SourceImage};
use super::calculations::quality_schedule;
use super::media::MediaType;
use super::params::{EncodeParams, QualityLevel, SizeBudget};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Unsupported format: {0} (expected image/jpeg or image/png)")]
    UnsupportedFormat(MediaType),
    #[error("Encode failed: {0}")]
    EncodeFailure(#[from] BackendError),
    #[error("Invalid compression settings: {0}")]
    InvalidSettings(String),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CompressError>;

/// Configuration for the compression loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressConfig {
    /// Exact output width in pixels.
    pub target_width: u32,
    pub start_quality: QualityLevel,
    /// Decrement per attempt, in percent.
    pub quality_step: u32,
    /// Exclusive lower bound, in percent.
    pub quality_floor: u32,
    pub budget: SizeBudget,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            target_width: 400,
            start_quality: QualityLevel::default(),
            quality_step: 5,
            quality_floor: 5,
            budget: SizeBudget::default(),
        }
    }
}

impl CompressConfig {
    /// Check that the schedule yields at least one attempt.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.target_width == 0 {
            return Err("target width must be non-zero".into());
        }
        if self.quality_step == 0 {
            return Err("quality step must be non-zero".into());
        }
        if self.start_quality.percent() <= self.quality_floor {
            return Err(format!(
                "start quality {} must be above the floor {:.2}",
                self.start_quality,
                self.quality_floor as f32 / 100.0
            ));
        }
        Ok(())
    }
}

/// One encode attempt: the quality used and the resulting size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub quality: QualityLevel,
    pub size: u64,
}

/// The image handed back to the caller.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub image: EncodedImage,
    pub size: u64,
    pub quality: QualityLevel,
    /// Every attempt in order; the last one produced `image`.
    pub attempts: Vec<Attempt>,
    pub within_budget: bool,
}

/// Shrink `source` into a WebP that fits `config.budget`.
///
/// Returns the first candidate within budget. When the quality floor is
/// reached first, returns the last candidate anyway: a budget overrun is not
/// an error. Fails only for an unsupported declared format (before any
/// encoding) or a backend failure (immediately, no retry).
pub fn compress_to_budget(
    backend: &impl ImageBackend,
    source: &SourceImage,
    config: &CompressConfig,
) -> Result<CompressedImage> {
    if !source.media_type().is_accepted_input() {
        return Err(CompressError::UnsupportedFormat(source.media_type().clone()));
    }
    config.validate().map_err(CompressError::InvalidSettings)?;

    let schedule = quality_schedule(
        config.start_quality,
        config.quality_step,
        config.quality_floor,
    );
    let mut current = source.path().to_path_buf();
    let mut attempts = Vec::with_capacity(schedule.len());
    let mut last = None;

    for quality in schedule {
        let candidate = backend.encode(&EncodeParams {
            source: current,
            width: config.target_width,
            quality,
        })?;
        let size = backend.size_of(&candidate)?;
        attempts.push(Attempt { quality, size });

        if config.budget.fits(size) {
            return Ok(CompressedImage {
                image: candidate,
                size,
                quality,
                attempts,
                within_budget: true,
            });
        }

        current = candidate.path.clone();
        last = Some((candidate, size, quality));
    }

    let (image, size, quality) = last.ok_or_else(|| {
        CompressError::InvalidSettings("quality schedule produced no attempts".into())
    })?;
    Ok(CompressedImage {
        image,
        size,
        quality,
        attempts,
        within_budget: false,
    })
}
