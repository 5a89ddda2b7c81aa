//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `original` inside a `max_dimension` x `max_dimension` box.
///
/// The longer edge becomes `max_dimension` and the shorter edge is scaled by
/// the same ratio, rounded to the nearest pixel and never below 1. Images
/// that already fit keep their size; nothing is upscaled.
///
/// # Examples
/// ```
/// # use gallery_push::imaging::calculate_bounded_dimensions;
/// assert_eq!(calculate_bounded_dimensions((4000, 3000), 600), (600, 450));
/// assert_eq!(calculate_bounded_dimensions((300, 200), 600), (300, 200));
/// ```
pub fn calculate_bounded_dimensions(original: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let longer_edge = orig_w.max(orig_h);

    if longer_edge <= max_dimension || longer_edge == 0 {
        return original;
    }

    let ratio = max_dimension as f64 / longer_edge as f64;
    let scale = |edge: u32| ((edge as f64 * ratio).round() as u32).clamp(1, max_dimension);

    if orig_w >= orig_h {
        // Landscape or square
        (max_dimension, scale(orig_h))
    } else {
        // Portrait
        (scale(orig_w), max_dimension)
    }
}
