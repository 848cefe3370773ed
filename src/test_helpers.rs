//! Shared test utilities for the media-variants test suite.
//!
//! Two kinds of helpers:
//!
//! - **Images**: synthetic pixel buffers and encoded fixtures built with the
//!   `image` crate, so codec tests never depend on files on disk.
//! - **Stores**: [`FaultyStore`], a [`MemoryStore`] wrapper that fails chosen
//!   keys and counts calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let store = FaultyStore::failing_puts(&["page-avatar.png"]);
//! let sizes = generator.generate(&encode_png(64, 64), "page.png", "image/png")?;
//! assert!(!sizes.contains_key("avatar"));
//! assert_eq!(store.put_calls(), CATALOG.len());
//! ```

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::imaging::DecodedImage;
use crate::store::{MemoryStore, ObjectStore, StoreError};

// =========================================================================
// Images
// =========================================================================

/// First bytes of every PNG file.
pub const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Opaque diagonal gradient: red follows x, green follows y.
pub fn gradient_image(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                ramp(x, width),
                ramp(y, height),
                128,
                255,
            ]);
        }
    }
    DecodedImage::new(width, height, pixels).unwrap()
}

/// Single-colour image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
    let pixels = rgba
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    DecodedImage::new(width, height, pixels).unwrap()
}

/// Mean absolute per-channel difference. Both images must share dimensions.
pub fn mean_abs_diff(a: &DecodedImage, b: &DecodedImage) -> f64 {
    assert_eq!(a.dimensions(), b.dimensions(), "dimension mismatch");
    let total: u64 = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    total as f64 / a.pixels().len() as f64
}

fn ramp(pos: u32, len: u32) -> u8 {
    (pos * 255 / len.saturating_sub(1).max(1)) as u8
}

fn rgba_fixture(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        // Alpha varies so PNG/WebP fixtures actually carry transparency
        image::Rgba([ramp(x, width), ramp(y, height), 64, 255 - ramp(x, width) / 2])
    })
}

fn write(image: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// A baseline JPEG of the given size.
pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([ramp(x, width), ramp(y, height), 64])
    });
    write(DynamicImage::ImageRgb8(rgb), image::ImageFormat::Jpeg)
}

/// An RGBA PNG with non-trivial alpha.
pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    write(
        DynamicImage::ImageRgba8(rgba_fixture(width, height)),
        image::ImageFormat::Png,
    )
}

/// A lossless RGBA WebP.
pub fn encode_webp(width: u32, height: u32) -> Vec<u8> {
    write(
        DynamicImage::ImageRgba8(rgba_fixture(width, height)),
        image::ImageFormat::WebP,
    )
}

// =========================================================================
// Stores
// =========================================================================

/// Memory store that fails `put`/`delete` for chosen keys and counts calls.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    fail_puts: HashSet<String>,
    fail_deletes: HashSet<String>,
    puts: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl FaultyStore {
    pub fn failing_puts(keys: &[&str]) -> Self {
        Self {
            fail_puts: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_deletes(keys: &[&str]) -> Self {
        Self {
            fail_deletes: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Number of `put` calls, failed ones included.
    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Keys passed to `delete`, failed ones included, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl ObjectStore for FaultyStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.contains(key) {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "injected put failure".into(),
            });
        }
        self.inner.put(key, bytes, content_type)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.deleted.lock().unwrap().push(key.to_string());
        if self.fail_deletes.contains(key) {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "injected delete failure".into(),
            });
        }
        self.inner.delete(key)
    }
}
