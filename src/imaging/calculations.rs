//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images. Both
//! codec paths resize through the same [`ResizePlan`], so a variant has the
//! same declared dimensions regardless of which backend produced it.

use super::params::{FitPolicy, ResizeTarget};

/// Region of the source image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How to turn a source image into a variant: take `source_crop` (or the
/// whole source) and resample it straight to `output`.
///
/// Cropping happens before scaling, so no buffer larger than `output` is
/// ever allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub source_crop: Option<CropRect>,
    pub output: (u32, u32),
    /// Largest `output` area a backend may allocate.
    pub max_pixels: u64,
}

impl ResizePlan {
    /// Final output dimensions.
    pub fn output(&self) -> (u32, u32) {
        self.output
    }

    /// Output area in pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.output.0) * u64::from(self.output.1)
    }

    pub fn within_budget(&self) -> bool {
        self.pixel_count() <= self.max_pixels
    }
}

/// Height that keeps the source aspect ratio at `target_width`.
///
/// `round(target_width * src_h / src_w)`, never below 1.
///
/// ```
/// # use media_variants::imaging::calculations::auto_height;
/// assert_eq!(auto_height(400, (1600, 1200)), 300);
/// assert_eq!(auto_height(400, (4000, 1)), 1);
/// ```
pub fn auto_height(target_width: u32, source: (u32, u32)) -> u32 {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let h = (target_width.max(1) as f64 * src_h as f64 / src_w as f64).round() as u32;
    h.max(1)
}

/// Centred region of `source` with the aspect ratio of `target`.
///
/// This is the part of the source that survives a cover resize. Scaling it
/// to `target` gives the same picture as scaling the whole source until it
/// covers `target` and then cropping the centre.
pub fn calculate_cover_crop(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (tgt_w, tgt_h) = (target.0.max(1), target.1.max(1));

    if u64::from(src_w) * u64::from(tgt_h) > u64::from(src_h) * u64::from(tgt_w) {
        // Source is wider: keep full height, trim the sides
        let w = (src_h as f64 * tgt_w as f64 / tgt_h as f64).round() as u32;
        let w = w.clamp(1, src_w);
        CropRect {
            x: (src_w - w) / 2,
            y: 0,
            width: w,
            height: src_h,
        }
    } else {
        // Source is taller: keep full width, trim top and bottom
        let h = (src_w as f64 * tgt_h as f64 / tgt_w as f64).round() as u32;
        let h = h.clamp(1, src_h);
        CropRect {
            x: 0,
            y: (src_h - h) / 2,
            width: src_w,
            height: h,
        }
    }
}

/// Calculate dimensions that fit inside a box while keeping the aspect ratio.
///
/// At least one axis touches the box; neither exceeds it.
pub fn calculate_inside_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (box_w, box_h) = (bounds.0.max(1), bounds.1.max(1));

    let scale = (box_w as f64 / src_w as f64).min(box_h as f64 / src_h as f64);
    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    (w.clamp(1, box_w), h.clamp(1, box_h))
}

/// Plan the resize of a `source`-sized image onto `target`.
///
/// Zero target dimensions are treated as 1 so the smallest possible output
/// is 1×1. A crop covering the whole source is dropped from the plan.
pub fn plan_resize(source: (u32, u32), target: &ResizeTarget) -> ResizePlan {
    let width = target.width.max(1);

    let (source_crop, output) = match (target.fit, target.height) {
        (FitPolicy::PreserveAspect, None) => (None, (width, auto_height(width, source))),
        (FitPolicy::PreserveAspect, Some(height)) => (
            None,
            calculate_inside_dimensions(source, (width, height.max(1))),
        ),
        (FitPolicy::CropToFill, height) => {
            let height = height.map_or_else(|| auto_height(width, source), |h| h.max(1));
            let crop = calculate_cover_crop(source, (width, height));
            let whole = (crop.width, crop.height) == source;
            ((!whole).then_some(crop), (width, height))
        }
    };

    ResizePlan {
        source_crop,
        output,
        max_pixels: target.max_pixels,
    }
}
