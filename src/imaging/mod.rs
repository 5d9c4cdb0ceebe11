//! Image processing: decode, resize, re-encode to WebP, measure.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, WebP) |
//! | **Resize** | `resize_exact` to the target width, Lanczos3 |
//! | **Encode → WebP** | `webp::Encoder` (lossy, quality-driven) |
//! | **Compress to budget** | [`compress_to_budget`] loop over the quality schedule |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and schedule math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Media**: Declared media types and the accepted-input set
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The compression loop combining calculations + backend

pub mod backend;
mod calculations;
pub mod media;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, EncodedImage, ImageBackend, SourceImage};
pub use calculations::{calculate_resize_dimensions, quality_schedule};
pub use media::{ACCEPTED_INPUTS, MediaType, OUTPUT_TYPE};
pub use operations::{
    Attempt, CompressConfig, CompressError, CompressedImage, compress_to_budget,
};
pub use params::{EncodeParams, QualityLevel, SizeBudget};
pub use rust_backend::RustBackend;
