//! Shared test utilities for the squeezepic test suite.
//!
//! Synthetic image fixtures are generated on the fly with the `image` crate,
//! so tests never depend on binary files checked into the repo.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let source = tmp.path().join("avatar.jpg");
//! create_test_jpeg(&source, 800, 600);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a JPEG (quality 95) with a busy gradient pattern.
///
/// The pattern has enough detail that WebP sizes respond to quality.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 7 % 256) as u8,
            (y * 3 % 256) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write an RGBA PNG with varying transparency.
pub fn create_test_png_with_alpha(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, (x % 200) as u8])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Filesystem
// =========================================================================

/// Create a one-byte placeholder file, making parent directories as needed.
///
/// Enough for picker and batch tests that run against the mock backend.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"x").unwrap();
}
