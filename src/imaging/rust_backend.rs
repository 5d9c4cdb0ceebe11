//! Pure Rust decode/resize with a libwebp encoder.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → lossy WebP | `webp::Encoder` (libwebp) |
//! | Size | file metadata of the written attempt |
//!
//! Every attempt is written to its own file under the backend's work
//! directory. Files stay until [`RustBackend::clear`] is called.

use super::backend::{BackendError, EncodedImage, ImageBackend};
use super::calculations::calculate_resize_dimensions;
use super::params::{EncodeParams, QualityLevel};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Production backend: `image` for pixels, libwebp for lossy WebP.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    work_dir: PathBuf,
    next_id: AtomicU64,
}

impl RustBackend {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Delete every attempt this backend has written.
    pub fn clear(&self) -> Result<(), BackendError> {
        if self.work_dir.exists() {
            std::fs::remove_dir_all(&self.work_dir)?;
        }
        Ok(())
    }

    fn next_output_path(&self, source: &Path) -> PathBuf {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        // Only our own attempts carry a `-aNNNN` suffix; user stems stay whole.
        let stem = match stem.rsplit_once("-a") {
            Some((base, n))
                if source.parent() == Some(self.work_dir.as_path())
                    && !n.is_empty()
                    && n.bytes().all(|b| b.is_ascii_digit()) =>
            {
                base.to_string()
            }
            _ => stem,
        };
        self.work_dir.join(format!("{stem}-a{id:04}.webp"))
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("squeezepic"))
    }
}

/// Load and decode an image, trusting the bytes over the extension.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode to lossy WebP. Alpha is kept when the source has it.
fn encode_webp(img: &DynamicImage, quality: QualityLevel) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (img.width(), img.height());
    let (pixels, layout) = if img.color().has_alpha() {
        (img.to_rgba8().into_raw(), webp::PixelLayout::Rgba)
    } else {
        (img.to_rgb8().into_raw(), webp::PixelLayout::Rgb)
    };
    let encoder = webp::Encoder::new(&pixels, layout, width, height);
    let memory = encoder
        .encode_simple(false, quality.percent() as f32)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
    Ok(memory.to_vec())
}

impl ImageBackend for RustBackend {
    fn encode(&self, params: &EncodeParams) -> Result<EncodedImage, BackendError> {
        let img = load_image(&params.source)?;
        let (width, height) =
            calculate_resize_dimensions((img.width(), img.height()), params.width);
        let resized = img.resize_exact(width, height, FilterType::Lanczos3);
        let bytes = encode_webp(&resized, params.quality)?;

        std::fs::create_dir_all(&self.work_dir)?;
        let output = self.next_output_path(&params.source);
        std::fs::write(&output, bytes)?;
        Ok(EncodedImage::new(output))
    }

    fn size_of(&self, image: &EncodedImage) -> Result<u64, BackendError> {
        Ok(std::fs::metadata(&image.path)?.len())
    }
}
