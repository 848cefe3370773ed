//! Portable codec path: standalone per-format codec modules.
//!
//! No native image pipeline involved: each format is driven through its own
//! decoder/encoder from `image::codecs`, pixels are normalised to RGBA8, and
//! resizing is the separate [`resize`](super::resize) step. This path is
//! always compiled in and is what the probe falls back to.
//!
//! | Format | Decode | Encode |
//! |---|---|---|
//! | JPEG | `JpegDecoder` | `JpegEncoder` (quality, alpha dropped) |
//! | PNG | `PngDecoder` | `PngEncoder` (best compression, lossless) |
//! | WebP | `WebPDecoder` | `WebPEncoder::new_lossless` |

use super::backend::{CodecAdapter, CodecError, DecodedImage};
use super::format::ImageFormat;
use super::params::Quality;
use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngDecoder, PngEncoder};
use image::codecs::webp::{WebPDecoder, WebPEncoder};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder};
use std::io::Cursor;

/// Codec backend built from independent per-format codec modules.
pub struct PortableCodec;

impl PortableCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PortableCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Run any `ImageDecoder` to completion and normalise to RGBA8.
fn decode_with(
    decoder: impl ImageDecoder,
    format: ImageFormat,
) -> Result<DecodedImage, CodecError> {
    let (width, height) = decoder.dimensions();
    let rgba = DynamicImage::from_decoder(decoder)
        .map_err(|e| CodecError::Decode {
            format,
            reason: e.to_string(),
        })?
        .into_rgba8();
    DecodedImage::new(width, height, rgba.into_raw())
}

fn decode_error(format: ImageFormat) -> impl Fn(image::ImageError) -> CodecError {
    move |e| CodecError::Decode {
        format,
        reason: e.to_string(),
    }
}

impl CodecAdapter for PortableCodec {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage, CodecError> {
        let reader = Cursor::new(bytes);
        match format {
            ImageFormat::Jpeg => {
                decode_with(JpegDecoder::new(reader).map_err(decode_error(format))?, format)
            }
            ImageFormat::Png => {
                decode_with(PngDecoder::new(reader).map_err(decode_error(format))?, format)
            }
            ImageFormat::WebP => {
                decode_with(WebPDecoder::new(reader).map_err(decode_error(format))?, format)
            }
        }
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: Option<Quality>,
    ) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        let (width, height) = image.dimensions();

        let result = match format {
            ImageFormat::Jpeg => {
                let quality = quality.unwrap_or_default();
                JpegEncoder::new_with_quality(&mut out, quality.as_u8()).write_image(
                    &image.to_rgb(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            ImageFormat::Png => PngEncoder::new_with_quality(
                &mut out,
                CompressionType::Best,
                PngFilter::Adaptive,
            )
            .write_image(image.pixels(), width, height, ExtendedColorType::Rgba8),
            ImageFormat::WebP => WebPEncoder::new_lossless(&mut out).write_image(
                image.pixels(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        };

        result.map_err(|e| CodecError::Encode {
            format,
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}
