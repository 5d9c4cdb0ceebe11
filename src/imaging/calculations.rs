//! Pure calculation functions for resize dimensions and quality schedules.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::QualityLevel;

/// Calculate output dimensions for a fixed-width resize.
///
/// The width is always `target_width` (images narrower than the target are
/// scaled up); the height keeps the source aspect ratio and never drops to 0.
///
/// # Examples
/// ```
/// # use squeezepic::imaging::calculate_resize_dimensions;
/// // 4000x3000 landscape → 400x300
/// assert_eq!(calculate_resize_dimensions((4000, 3000), 400), (400, 300));
///
/// // 1080x1920 portrait → 400x711
/// assert_eq!(calculate_resize_dimensions((1080, 1920), 400), (400, 711));
/// ```
pub fn calculate_resize_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return (target_width, orig_h.max(1));
    }
    let h = (target_width as f64 * orig_h as f64 / orig_w as f64).round() as u32;
    (target_width, h.max(1))
}

/// Every quality level the compressor may try, in order.
///
/// Starts at `start`, decreases by `step`, and stops before reaching
/// `floor` (exclusive). Empty when `start <= floor` or `step == 0`.
pub fn quality_schedule(start: QualityLevel, step: u32, floor: u32) -> Vec<QualityLevel> {
    if start.percent() <= floor || step == 0 {
        return Vec::new();
    }
    std::iter::successors(Some(start), |q| q.step_down(step, floor)).collect()
}
