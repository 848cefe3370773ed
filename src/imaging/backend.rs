//! Codec adapter trait and shared types.
//!
//! The [`CodecAdapter`] trait defines the three operations every backend must
//! support: decode, resize and encode. Two implementations exist:
//!
//! | Backend | Decode | Resize | Encode |
//! |---|---|---|---|
//! | [`NativeCodec`](super::native_backend::NativeCodec) | `image::load_from_memory_with_format` | `image::imageops` Lanczos3 | `DynamicImage::write_with_encoder` |
//! | [`PortableCodec`](super::portable_backend::PortableCodec) | per-format `image::codecs` decoders | [`resize`](super::resize) (`fast_image_resize`) | per-format `image::codecs` encoders |
//!
//! Both exchange pixels as [`DecodedImage`] (8-bit RGBA, row-major), so an
//! image decoded by one path can be resized and encoded by the other.
//! Which one runs is decided once at startup by the [`probe`](super::probe).

use super::calculations::{ResizePlan, plan_resize};
use super::format::ImageFormat;
use super::params::{Quality, ResizeTarget};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode {format}: {reason}")]
    Decode {
        format: ImageFormat,
        reason: String,
    },
    #[error("failed to encode {format}: {reason}")]
    Encode {
        format: ImageFormat,
        reason: String,
    },
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),
}

#[derive(Error, Debug)]
#[error("resize {from:?} -> {to:?} failed: {reason}")]
pub struct ResizeError {
    pub from: (u32, u32),
    pub to: (u32, u32),
    pub reason: String,
}

/// Raw decoded pixels: 8-bit RGBA, row-major, top-to-bottom.
///
/// Invariant: `width > 0`, `height > 0` and
/// `pixels.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::InvalidBuffer(format!(
                "zero dimension {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(CodecError::InvalidBuffer(format!(
                "{width}x{height} RGBA needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Drop the alpha channel (for encoders without alpha support).
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

/// Refuse a plan whose output exceeds its pixel budget.
///
/// Backends call this before allocating the output buffer.
pub fn ensure_within_budget(from: (u32, u32), plan: &ResizePlan) -> Result<(), ResizeError> {
    if plan.within_budget() {
        return Ok(());
    }
    Err(ResizeError {
        from,
        to: plan.output(),
        reason: format!(
            "output of {} pixels exceeds the budget of {}",
            plan.pixel_count(),
            plan.max_pixels
        ),
    })
}

/// Trait for codec backends.
///
/// Implementations must be `Send + Sync`: the orchestrator shares one backend
/// across rayon workers, one per variant.
pub trait CodecAdapter: Send + Sync {
    /// Short backend name for logs and CLI output.
    fn name(&self) -> &'static str;

    /// Decode `bytes` (already sniffed as `format`) into RGBA pixels.
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage, CodecError>;

    /// Encode RGBA pixels to `format`. Backends ignore `quality` for lossless
    /// formats.
    fn encode(
        &self,
        image: &DecodedImage,
        format: ImageFormat,
        quality: Option<Quality>,
    ) -> Result<Vec<u8>, CodecError>;

    /// Execute a resize plan. Defaults to the portable Lanczos3 resizer.
    ///
    /// Implementations must reject plans that are not
    /// [`within_budget`](ResizePlan::within_budget) with a [`ResizeError`].
    fn resize_planned(
        &self,
        image: &DecodedImage,
        plan: &ResizePlan,
    ) -> Result<DecodedImage, ResizeError> {
        super::resize::apply_plan(image, plan)
    }

    /// Resize onto a target box according to its fit policy.
    fn resize(
        &self,
        image: &DecodedImage,
        target: &ResizeTarget,
    ) -> Result<DecodedImage, ResizeError> {
        let plan = plan_resize(image.dimensions(), target);
        self.resize_planned(image, &plan)
    }
}
