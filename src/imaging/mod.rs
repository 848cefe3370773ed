//! Image processing: sniff, decode, resize, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect** | magic-byte sniffing ([`format::detect`]) |
//! | **Decode** | `image` codecs → RGBA8 [`DecodedImage`] |
//! | **Resize** | Lanczos3 (`fast_image_resize` or `image::imageops`) |
//! | **Encode** | same format as the source, per-variant quality |
//!
//! The module is split into:
//! - **Format**: magic-byte detection and extension/mimetype mapping
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`CodecAdapter`] trait + [`NativeCodec`] / [`PortableCodec`]
//! - **Probe**: one-time capability check choosing the backend

pub mod backend;
pub mod calculations;
pub mod format;
#[cfg(feature = "native")]
pub mod native_backend;
mod params;
pub mod portable_backend;
pub mod probe;
pub mod resize;

pub use backend::{CodecAdapter, CodecError, DecodedImage, ResizeError};
pub use format::{ImageFormat, detect};
#[cfg(feature = "native")]
pub use native_backend::NativeCodec;
pub use params::{DEFAULT_MAX_OUTPUT_PIXELS, FitPolicy, Quality, ResizeTarget};
pub use portable_backend::PortableCodec;
pub use probe::{BackendChoice, Capabilities, ProbeError};
