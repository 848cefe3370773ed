//! Native codec path: the `image` crate's integrated pipeline.
//!
//! Compiled only with the `native` cargo feature. Decoding goes through
//! `image::load_from_memory_with_format`, resizing through
//! `image::imageops` (`crop_imm` on the source, then Lanczos3) and encoding
//! through `DynamicImage::write_with_encoder`, so decode, resize and encode
//! all stay inside one library's buffer types.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory_with_format` |
//! | Cover crop (source region) | `image::imageops::crop_imm` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode | `DynamicImage::write_with_encoder` |

use super::backend::{
    CodecAdapter, CodecError, DecodedImage, ResizeError, ensure_within_budget,
};
use super::calculations::ResizePlan;
use super::format::ImageFormat;
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;

/// Formats this backend must both read and write to be usable.
const REQUIRED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

/// Codec backend using the `image` crate's high-level API.
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Whether the compiled `image` crate can read and write every
    /// required format. Never panics; a `false` just means "use the
    /// portable path".
    pub fn is_available() -> bool {
        REQUIRED_FORMATS.iter().all(|f| {
            let fmt = f.to_image_crate();
            fmt.reading_enabled() && fmt.writing_enabled()
        })
    }
}

impl Default for NativeCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn to_rgba_image(image: &DecodedImage) -> Result<RgbaImage, CodecError> {
    RgbaImage::from_raw(image.width(), image.height(), image.pixels().to_vec()).ok_or_else(
        || {
            CodecError::InvalidBuffer(format!(
                "{}x{} buffer rejected by image crate",
                image.width(),
                image.height()
            ))
        },
    )
}

impl CodecAdapter for NativeCodec {
    fn name(&self) -> &'static str {
        "native"
    }

    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage, CodecError> {
        let img = image::load_from_memory_with_format(bytes, format.to_image_crate()).map_err(
            |e| CodecError::Decode {
                format,
                reason: e.to_string(),
            },
        )?;
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        DecodedImage::new(width, height, rgba.into_raw())
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: Option<Quality>,
    ) -> Result<Vec<u8>, CodecError> {
        let img = DynamicImage::ImageRgba8(to_rgba_image(image)?);
        let mut out = Cursor::new(Vec::new());

        let result = match format {
            ImageFormat::Jpeg => {
                let quality = quality.unwrap_or_default();
                DynamicImage::ImageRgb8(img.into_rgb8()).write_with_encoder(
                    JpegEncoder::new_with_quality(&mut out, quality.as_u8()),
                )
            }
            ImageFormat::Png => img.write_with_encoder(PngEncoder::new_with_quality(
                &mut out,
                CompressionType::Best,
                PngFilter::Adaptive,
            )),
            ImageFormat::WebP => img.write_with_encoder(WebPEncoder::new_lossless(&mut out)),
        };

        result.map_err(|e| CodecError::Encode {
            format,
            reason: e.to_string(),
        })?;
        Ok(out.into_inner())
    }

    fn resize_planned(
        &self,
        image: &DecodedImage,
        plan: &ResizePlan,
    ) -> Result<DecodedImage, ResizeError> {
        let err = |reason: String| ResizeError {
            from: image.dimensions(),
            to: plan.output(),
            reason,
        };

        ensure_within_budget(image.dimensions(), plan)?;
        let (out_w, out_h) = plan.output();
        tracing::debug!(
            source = ?image.dimensions(),
            crop = ?plan.source_crop,
            output = ?(out_w, out_h),
            "native resize"
        );

        let src = to_rgba_image(image).map_err(|e| err(e.to_string()))?;
        let region = match &plan.source_crop {
            Some(c) => imageops::crop_imm(&src, c.x, c.y, c.width, c.height).to_image(),
            None => src,
        };
        let out = if region.dimensions() == (out_w, out_h) {
            region
        } else {
            imageops::resize(&region, out_w, out_h, FilterType::Lanczos3)
        };

        let (width, height) = out.dimensions();
        DecodedImage::new(width, height, out.into_raw()).map_err(|e| err(e.to_string()))
    }
}
