//! Format detection by magic bytes.
//!
//! The declared mimetype and the filename extension of an upload are
//! untrusted hints. The real format is decided here from the first 12 bytes
//! of the buffer, and everything downstream (decoder, encoder, output
//! extension, stored content type) follows from it.
//!
//! | Format | Signature |
//! |---|---|
//! | JPEG | `FF D8 FF` at offset 0 |
//! | PNG | `89 50 4E 47` at offset 0 |
//! | WebP | `RIFF` at offset 0 and `WEBP` at offset 8 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image formats the pipeline can decode and re-encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// File extension used for generated variants.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
        }
    }

    /// Content type stored alongside each published variant.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Matching format in the `image` crate.
    pub(crate) fn to_image_crate(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::WebP => "WebP",
        };
        f.write_str(name)
    }
}

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MAGIC: &[u8] = b"WEBP";

/// Sniff the format of `buffer`. Returns `None` for anything unrecognised,
/// including buffers too short to carry a signature.
pub fn detect(buffer: &[u8]) -> Option<ImageFormat> {
    if buffer.starts_with(JPEG_MAGIC) {
        return Some(ImageFormat::Jpeg);
    }
    if buffer.starts_with(PNG_MAGIC) {
        return Some(ImageFormat::Png);
    }
    if buffer.starts_with(RIFF_MAGIC) && buffer.get(8..12) == Some(WEBP_MAGIC) {
        return Some(ImageFormat::WebP);
    }
    None
}
