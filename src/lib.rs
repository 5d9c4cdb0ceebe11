//! # squeezepic
//!
//! Turns a picked profile picture into a small WebP that fits an upload
//! size budget. The picture is resized to a fixed width and re-encoded at
//! decreasing quality until it fits, or until the quality floor is reached,
//! in which case the last attempt is kept.
//!
//! ```text
//! pick  →  SourceImage (declared JPEG/PNG)
//!       →  encode @ 0.60 → size? → encode @ 0.55 → size? → …
//!       →  CompressedImage (WebP, first attempt ≤ budget, or the last one)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Media types, quality/budget types, backend trait, the compression loop |
//! | [`picker`] | Where source images come from; the pick → compress flow |
//! | [`process`] | Batch stage: expand inputs, compress in parallel, write outputs and report |
//! | [`config`] | `squeezepic.toml` loading, layering with CLI overrides, validation |
//! | [`output`] | CLI output formatting for progress events and summaries |
//!
//! # Design Decisions
//!
//! ## WebP-Only Output
//!
//! Whatever comes in, a WebP goes out. One output format keeps the upload
//! side trivial: a single MIME type and a single file extension.
//!
//! ## Best Effort Over Strictness
//!
//! Missing the budget is not an error. An image that is still too large at
//! the lowest quality is returned anyway and flagged `within_budget: false`.
//! Only two things fail a compression: an input type outside JPEG/PNG
//! (rejected before any encoding) and a backend error (surfaced at once,
//! never retried).
//!
//! ## Chained Attempts
//!
//! Every attempt re-encodes the previous attempt's output, not the original.
//! Losses compound, which is what drives sizes down quickly at the tail of
//! the schedule. Changing this changes which sizes are reachable.
//!
//! ## Whole-Percent Quality
//!
//! Quality is stored as an integer percent. Stepping 0.60 down by 0.05 in
//! floating point drifts and yields a twelfth attempt just above the 0.05
//! floor; integers give exactly eleven.

pub mod config;
pub mod imaging;
pub mod output;
pub mod picker;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
