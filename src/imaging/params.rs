//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between the orchestrator (which walks the variant catalog) and
//! a [`CodecAdapter`](super::backend::CodecAdapter) (which does the pixel
//! work), so backends can be swapped without touching the catalog logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`FitPolicy`]: How a source aspect ratio maps onto a target box.
//! - [`ResizeTarget`]: Target box for one resize: width, optional height, fit
//!   policy and the pixel budget the output must stay within.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// The value as the `u8` the JPEG encoder expects.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Rule for mapping the source aspect ratio onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitPolicy {
    /// Scale to fit inside the box, no cropping. Output is at most the box
    /// on both axes and keeps the source aspect ratio.
    PreserveAspect,
    /// Scale to cover the box, then center-crop the overflowing axis.
    /// Output is exactly the box.
    CropToFill,
}

/// Default output budget: 40 megapixels, 160 MB of RGBA.
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 40_000_000;

/// Target box for one resize.
///
/// A missing `height` means "derive from the source aspect ratio by width".
/// Outputs larger than `max_pixels` are refused before any buffer is
/// allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: Option<u32>,
    pub fit: FitPolicy,
    pub max_pixels: u64,
}

impl ResizeTarget {
    pub fn new(width: u32, height: Option<u32>, fit: FitPolicy) -> Self {
        Self {
            width,
            height,
            fit,
            max_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}
