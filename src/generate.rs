//! Variant generation orchestrator.
//!
//! Takes one uploaded original and produces every catalog variant:
//!
//! ```text
//! bytes ─ detect ─ decode (once) ─┬─ resize ─ encode ─ publish ─→ thumbnail
//!                                 ├─ resize ─ encode ─ publish ─→ thumbnail_small
//!                                 └─ ...                          (one per spec)
//! ```
//!
//! ## Failure policy
//!
//! | Stage | Error | Effect |
//! |---|---|---|
//! | detect | [`GenerateError::UnsupportedFormat`] | whole call fails, nothing stored |
//! | decode | [`GenerateError::Decode`] | whole call fails, nothing stored |
//! | resize / encode / publish | [`VariantError`] | variant skipped and logged, others continue |
//!
//! The returned map therefore holds between zero and `catalog.len()`
//! entries. An entry is only added after its upload completed.
//!
//! ## Parallel Processing
//!
//! Variants share nothing but the read-only decoded original, so they run in
//! parallel with [rayon](https://docs.rs/rayon). Each variant is attempted
//! exactly once per call.

use crate::catalog::{CATALOG, VariantSpec};
use crate::config::PipelineConfig;
use crate::imaging::{
    CodecAdapter, CodecError, DEFAULT_MAX_OUTPUT_PIXELS, DecodedImage, ImageFormat, Quality,
    ResizeError, detect,
};
use crate::naming::variant_filename;
use crate::publish::{PublishError, Publisher};
use crate::store::ObjectStore;
use crate::types::{GeneratedVariant, VariantMetadataMap};
use rayon::prelude::*;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Call-level failures: no variant can be produced.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("unsupported image format: magic bytes match neither JPEG, PNG nor WebP")]
    UnsupportedFormat,
    #[error("failed to decode original: {0}")]
    Decode(#[source] CodecError),
}

/// Variant-level failures: only the affected variant is skipped.
#[derive(Error, Debug)]
pub enum VariantError {
    #[error("resize failed: {0}")]
    Resize(#[from] ResizeError),
    #[error("encode failed: {0}")]
    Encode(#[from] CodecError),
    #[error("{0}")]
    Publish(#[from] PublishError),
}

/// Progress events emitted while generating.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    Started {
        filename: String,
        format: ImageFormat,
        width: u32,
        height: u32,
        backend: &'static str,
    },
    VariantPublished {
        name: String,
        filename: String,
        width: u32,
        height: u32,
        file_size: u64,
    },
    VariantFailed {
        name: String,
        reason: String,
    },
}

/// Produces and publishes the catalog variants of an original.
pub struct VariantGenerator<'a> {
    codec: &'a dyn CodecAdapter,
    publisher: Publisher<'a>,
    catalog: &'a [VariantSpec],
    default_quality: Quality,
    max_output_pixels: u64,
}

impl<'a> VariantGenerator<'a> {
    pub fn new(
        codec: &'a dyn CodecAdapter,
        store: &'a dyn ObjectStore,
        url_base: impl Into<String>,
    ) -> Self {
        Self {
            codec,
            publisher: Publisher::new(store, url_base),
            catalog: CATALOG,
            default_quality: Quality::default(),
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }

    /// Generator wired from config (URL base, default quality, pixel budget).
    pub fn from_config(
        codec: &'a dyn CodecAdapter,
        store: &'a dyn ObjectStore,
        config: &PipelineConfig,
    ) -> Self {
        Self::new(codec, store, config.media.url_base.clone())
            .with_default_quality(config.default_quality())
            .with_max_output_pixels(config.images.max_output_pixels)
    }

    /// Replace the catalog. Names must be unique.
    pub fn with_catalog(mut self, catalog: &'a [VariantSpec]) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_default_quality(mut self, quality: Quality) -> Self {
        self.default_quality = quality;
        self
    }

    /// Cap on a single variant's area. Larger variants fail with
    /// [`VariantError::Resize`] and are left out of the map.
    pub fn with_max_output_pixels(mut self, max_pixels: u64) -> Self {
        self.max_output_pixels = max_pixels;
        self
    }

    /// Generate and publish every variant of `bytes`.
    ///
    /// `mime_type` is the uploader's declared type and is advisory only;
    /// the output format always follows the sniffed format.
    pub fn generate(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<VariantMetadataMap, GenerateError> {
        self.generate_with_events(bytes, filename, mime_type, None)
    }

    /// [`generate`](Self::generate) with progress events sent to `events`.
    pub fn generate_with_events(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
        events: Option<Sender<GenerateEvent>>,
    ) -> Result<VariantMetadataMap, GenerateError> {
        let format = detect(bytes).ok_or_else(|| {
            tracing::warn!(filename, mime_type, "rejecting upload with unknown format");
            GenerateError::UnsupportedFormat
        })?;
        if mime_type != format.mime_type() {
            tracing::debug!(
                filename,
                declared = mime_type,
                detected = format.mime_type(),
                "declared mimetype differs from sniffed format"
            );
        }

        let original = self
            .codec
            .decode(bytes, format)
            .map_err(GenerateError::Decode)?;
        tracing::info!(
            filename,
            %format,
            width = original.width(),
            height = original.height(),
            backend = self.codec.name(),
            "generating {} variants",
            self.catalog.len()
        );
        emit(
            &events,
            GenerateEvent::Started {
                filename: filename.to_string(),
                format,
                width: original.width(),
                height: original.height(),
                backend: self.codec.name(),
            },
        );

        let sizes: VariantMetadataMap = self
            .catalog
            .par_iter()
            .filter_map(|spec| {
                let outcome = self
                    .render_variant(&original, format, filename, spec)
                    .and_then(|variant| {
                        self.publisher.publish(&variant).map_err(VariantError::from)
                    });
                match outcome {
                    Ok(meta) => {
                        tracing::info!(
                            variant = spec.name,
                            key = %meta.filename,
                            width = meta.width,
                            height = meta.height,
                            bytes = meta.file_size,
                            "variant published"
                        );
                        emit(
                            &events,
                            GenerateEvent::VariantPublished {
                                name: spec.name.to_string(),
                                filename: meta.filename.clone(),
                                width: meta.width,
                                height: meta.height,
                                file_size: meta.file_size,
                            },
                        );
                        Some((spec.name.to_string(), meta))
                    }
                    Err(e) => {
                        tracing::warn!(variant = spec.name, filename, error = %e, "variant skipped");
                        emit(
                            &events,
                            GenerateEvent::VariantFailed {
                                name: spec.name.to_string(),
                                reason: e.to_string(),
                            },
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(sizes)
    }

    /// Resize and encode one variant without publishing it.
    pub fn render_variant(
        &self,
        original: &DecodedImage,
        format: ImageFormat,
        filename: &str,
        spec: &VariantSpec,
    ) -> Result<GeneratedVariant, VariantError> {
        let target = spec.target().with_max_pixels(self.max_output_pixels);
        let resized = self.codec.resize(original, &target)?;
        let quality = spec.quality.unwrap_or(self.default_quality);
        let bytes = self.codec.encode(&resized, format, Some(quality))?;

        Ok(GeneratedVariant {
            name: spec.name.to_string(),
            bytes,
            width: resized.width(),
            height: resized.height(),
            filename: variant_filename(filename, spec.name, format),
            mime_type: format.mime_type().to_string(),
        })
    }
}

fn emit(events: &Option<Sender<GenerateEvent>>, event: GenerateEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening
        let _ = tx.send(event);
    }
}
