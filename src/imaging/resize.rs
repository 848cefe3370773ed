//! Portable Lanczos3 resizer over RGBA buffers.
//!
//! Resampling runs through `fast_image_resize` with a Lanczos3 convolution
//! (alpha is premultiplied for the duration of the convolution so transparent
//! edges do not bleed dark fringes). A cover crop is passed to the resizer as
//! a source region, so only the kept part of the source is read and the only
//! buffer allocated is the output itself.

use super::backend::{DecodedImage, ResizeError, ensure_within_budget};
use super::calculations::{CropRect, ResizePlan};
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};

/// Resample `region` of `image` (the whole image when `None`) to exactly
/// `width × height` with Lanczos3.
pub fn scale_region(
    image: &DecodedImage,
    region: Option<&CropRect>,
    width: u32,
    height: u32,
) -> Result<DecodedImage, ResizeError> {
    let width = width.max(1);
    let height = height.max(1);
    let err = |reason: String| ResizeError {
        from: image.dimensions(),
        to: (width, height),
        reason,
    };

    if let Some(c) = region {
        let (src_w, src_h) = image.dimensions();
        if c.width == 0
            || c.height == 0
            || u64::from(c.x) + u64::from(c.width) > u64::from(src_w)
            || u64::from(c.y) + u64::from(c.height) > u64::from(src_h)
        {
            return Err(err(format!("crop {c:?} outside source")));
        }
    } else if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let src = ImageRef::new(image.width(), image.height(), image.pixels(), PixelType::U8x4)
        .map_err(|e| err(e.to_string()))?;
    let mut dst = Image::new(width, height, PixelType::U8x4);

    let mut options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    if let Some(c) = region {
        options = options.crop(
            f64::from(c.x),
            f64::from(c.y),
            f64::from(c.width),
            f64::from(c.height),
        );
    }
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| err(e.to_string()))?;

    DecodedImage::new(width, height, dst.into_vec()).map_err(|e| err(e.to_string()))
}

/// Execute a [`ResizePlan`] after checking its pixel budget.
pub fn apply_plan(image: &DecodedImage, plan: &ResizePlan) -> Result<DecodedImage, ResizeError> {
    ensure_within_budget(image.dimensions(), plan)?;
    let (width, height) = plan.output();
    tracing::debug!(
        source = ?image.dimensions(),
        crop = ?plan.source_crop,
        output = ?(width, height),
        "portable resize"
    );
    scale_region(image, plan.source_crop.as_ref(), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::plan_resize;
    use crate::imaging::{FitPolicy, ResizeTarget};
    use crate::test_helpers::{gradient_image, mean_abs_diff, solid_image};

    #[test]
    fn scale_down_keeps_solid_color() {
        let src = solid_image(64, 48, [200, 40, 90, 255]);
        let out = scale_region(&src, None, 16, 12).unwrap();
        assert_eq!(out.dimensions(), (16, 12));
        for px in out.pixels().chunks_exact(4) {
            assert!((px[0] as i32 - 200).abs() <= 1);
            assert!((px[1] as i32 - 40).abs() <= 1);
            assert!((px[2] as i32 - 90).abs() <= 1);
        }
    }

    #[test]
    fn scale_up_from_single_pixel() {
        let src = solid_image(1, 1, [10, 20, 30, 255]);
        let out = scale_region(&src, None, 800, 800).unwrap();
        assert_eq!(out.dimensions(), (800, 800));
        let px = &out.pixels()[..4];
        assert!((px[0] as i32 - 10).abs() <= 1);
        assert!((px[2] as i32 - 30).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn scale_same_size_is_identity() {
        let src = gradient_image(20, 10);
        assert_eq!(scale_region(&src, None, 20, 10).unwrap(), src);
    }

    #[test]
    fn scaled_gradient_is_structurally_similar() {
        let src = gradient_image(256, 256);
        let down = scale_region(&src, None, 128, 128).unwrap();
        let expected = gradient_image(128, 128);
        assert!(mean_abs_diff(&down, &expected) < 4.0);
    }

    #[test]
    fn region_extracts_center_columns() {
        // 4x1 image with distinct red values per column
        let pixels = (0..4u8).flat_map(|i| [i * 10, 0, 0, 255]).collect();
        let src = DecodedImage::new(4, 1, pixels).unwrap();
        let region = CropRect {
            x: 1,
            y: 0,
            width: 2,
            height: 1,
        };
        let out = scale_region(&src, Some(&region), 2, 1).unwrap();
        assert_eq!(out.dimensions(), (2, 1));
        assert!((out.pixels()[0] as i32 - 10).abs() <= 2);
        assert!((out.pixels()[4] as i32 - 20).abs() <= 2);
    }

    #[test]
    fn region_outside_bounds_errors() {
        let src = solid_image(4, 4, [0, 0, 0, 255]);
        let region = CropRect {
            x: 3,
            y: 0,
            width: 2,
            height: 2,
        };
        assert!(scale_region(&src, Some(&region), 2, 2).is_err());
    }

    #[test]
    fn apply_plan_cover_is_exact() {
        let src = gradient_image(300, 100);
        let plan = plan_resize(
            src.dimensions(),
            &ResizeTarget::new(50, Some(50), FitPolicy::CropToFill),
        );
        let out = apply_plan(&src, &plan).unwrap();
        assert_eq!(out.dimensions(), (50, 50));
    }

    #[test]
    fn apply_plan_tall_strip_cover_is_exact() {
        let src = solid_image(1, 3000, [50, 60, 70, 255]);
        let plan = plan_resize(
            src.dimensions(),
            &ResizeTarget::new(1200, Some(630), FitPolicy::CropToFill),
        );
        let out = apply_plan(&src, &plan).unwrap();
        assert_eq!(out.dimensions(), (1200, 630));
        assert!((out.pixels()[0] as i32 - 50).abs() <= 1);
    }

    #[test]
    fn apply_plan_refuses_over_budget_output() {
        let src = solid_image(1, 3000, [0, 0, 0, 255]);
        let plan = plan_resize(
            src.dimensions(),
            &ResizeTarget::new(800, None, FitPolicy::PreserveAspect),
        );
        let err = apply_plan(&src, &plan).unwrap_err();
        assert_eq!(err.to, (800, 2_400_000));
    }
}
