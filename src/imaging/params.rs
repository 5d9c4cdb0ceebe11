//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which drives the compression loop) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing the loop.
//!
//! ## Types
//!
//! - [`QualityLevel`] — Lossy encoding quality in (0, 1], stored as whole percent.
//! - [`SizeBudget`] — Byte ceiling the final output should not exceed.
//! - [`EncodeParams`] — Full specification for one encode attempt: input, width, quality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Encoder quality, 1–100 percent of the encoder's scale.
///
/// Conceptually a real number in (0, 1]. Whole percent keeps repeated
/// subtraction exact: 60 - 11 × 5 lands on 5, not on 0.05000000000000001.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityLevel(u32);

impl QualityLevel {
    pub fn from_percent(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn percent(self) -> u32 {
        self.0
    }

    /// The quality as a fraction in (0, 1].
    pub fn as_fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// Next level down, or `None` if it would not stay strictly above `floor`.
    pub fn step_down(self, step: u32, floor: u32) -> Option<Self> {
        self.0
            .checked_sub(step)
            .filter(|&next| next > floor && next < self.0)
            .map(Self)
    }
}

impl Default for QualityLevel {
    fn default() -> Self {
        Self(60)
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_fraction())
    }
}

/// Maximum acceptable size, in bytes, of the final encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeBudget(u64);

impl SizeBudget {
    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// KiB to bytes, saturating at `u64::MAX`.
    pub fn from_kb(kb: u64) -> Self {
        Self(kb.saturating_mul(1024))
    }

    pub fn bytes(self) -> u64 {
        self.0
    }

    pub fn fits(self, size: u64) -> bool {
        size <= self.0
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::from_kb(50)
    }
}

/// Parameters for one encode attempt.
///
/// `source` is either the picked image or the previous attempt's output.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    /// Exact output width; height follows the source aspect ratio.
    pub width: u32,
    pub quality: QualityLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(QualityLevel::from_percent(0).percent(), 1);
        assert_eq!(QualityLevel::from_percent(60).percent(), 60);
        assert_eq!(QualityLevel::from_percent(150).percent(), 100);
    }

    #[test]
    fn quality_default_is_point_six() {
        assert_eq!(QualityLevel::default().as_fraction(), 0.6);
        assert_eq!(QualityLevel::default().to_string(), "0.60");
    }

    #[test]
    fn step_down_stops_above_floor() {
        let q = QualityLevel::from_percent(15);
        let next = q.step_down(5, 5).unwrap();
        assert_eq!(next.percent(), 10);
        // 10 - 5 = 5 is not strictly above the floor
        assert_eq!(next.step_down(5, 5), None);
    }

    #[test]
    fn step_down_handles_underflow_and_zero_step() {
        assert_eq!(QualityLevel::from_percent(3).step_down(5, 0), None);
        assert_eq!(QualityLevel::from_percent(30).step_down(0, 5), None);
    }

    #[test]
    fn budget_from_kb_is_binary_kilobytes() {
        assert_eq!(SizeBudget::from_kb(50).bytes(), 51_200);
        assert_eq!(SizeBudget::default(), SizeBudget::from_kb(50));
    }

    #[test]
    fn budget_from_kb_saturates() {
        assert_eq!(SizeBudget::from_kb(u64::MAX / 512).bytes(), u64::MAX);
    }

    #[test]
    fn budget_fits_is_inclusive() {
        let budget = SizeBudget::from_bytes(100);
        assert!(budget.fits(99));
        assert!(budget.fits(100));
        assert!(!budget.fits(101));
    }
}
