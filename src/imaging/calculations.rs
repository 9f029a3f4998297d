//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Anchor;

/// A crop window in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the source region kept by a fit (cover-then-crop) operation.
///
/// The window has the target's aspect ratio and is as large as the source
/// allows, so scaling it to `target` covers the box with no empty borders.
/// The anchor decides where the window sits along the axis that gets cropped:
/// `0.0` keeps the leading edge, `1.0` the trailing edge.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Final output dimensions (width, height)
/// * `anchor` - Normalized anchor, clamped into `[0, 1]`
///
/// # Examples
/// ```
/// # use preset_gal::imaging::{Anchor, CropRect, calculate_fit_crop};
/// // 1000x500 to a square, centered → the middle 500x500
/// let rect = calculate_fit_crop((1000, 500), (100, 100), Anchor::CENTER);
/// assert_eq!(rect, CropRect { x: 250, y: 0, width: 500, height: 500 });
/// ```
pub fn calculate_fit_crop(source: (u32, u32), target: (u32, u32), anchor: Anchor) -> CropRect {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (tgt_w, tgt_h) = (target.0.max(1), target.1.max(1));
    let anchor = anchor.clamped();

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    let (crop_w, crop_h) = if src_aspect > tgt_aspect {
        // Source is wider: keep full height, crop the sides
        let w = (src_h as f64 * tgt_aspect).round() as u32;
        (w.clamp(1, src_w), src_h)
    } else if src_aspect < tgt_aspect {
        // Source is taller: keep full width, crop top/bottom
        let h = (src_w as f64 / tgt_aspect).round() as u32;
        (src_w, h.clamp(1, src_h))
    } else {
        (src_w, src_h)
    };

    let x = ((src_w - crop_w) as f64 * anchor.x).round() as u32;
    let y = ((src_h - crop_h) as f64 * anchor.y).round() as u32;

    CropRect {
        x: x.min(src_w - crop_w),
        y: y.min(src_h - crop_h),
        width: crop_w,
        height: crop_h,
    }
}

/// Calculate dimensions that fit within a bounding box, preserving aspect ratio.
///
/// Never upscales: a source already inside the box is returned unchanged.
/// Neither edge drops below one pixel.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (width, height)
///
/// # Returns
/// * `(width, height)` - Dimensions no larger than `bounds` on either edge
pub fn calculate_fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = (bounds.0.max(1), bounds.1.max(1));

    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}
