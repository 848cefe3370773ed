//! Variant filename convention.
//!
//! Every variant is stored under `{basename}-{variant}.{ext}`:
//!
//! ```text
//! page-12.png  + thumbnail → page-12-thumbnail.png
//! cover.jpeg   + avatar    → cover-avatar.jpg
//! scan.PNG     + avatar    → scan-avatar.png     (ext from the sniffed format)
//! ```
//!
//! The extension comes from the detected format, never from the upload's
//! own extension, so a PNG uploaded as `photo.jpg` still produces `.png`
//! variants with a matching content type.

use crate::imaging::ImageFormat;

/// Fallback stem when the upload name has nothing usable.
const DEFAULT_STEM: &str = "image";

/// Strip any directory components and the final extension.
///
/// Dotfiles keep their name (`.hidden` stays `.hidden`).
pub fn basename(filename: &str) -> &str {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    };

    if stem.is_empty() { DEFAULT_STEM } else { stem }
}

/// Deterministic storage key for one variant of `original_filename`.
pub fn variant_filename(original_filename: &str, variant: &str, format: ImageFormat) -> String {
    format!(
        "{}-{}.{}",
        basename(original_filename),
        variant,
        format.extension()
    )
}
