//! Publishing encoded variants and assembling their metadata.
//!
//! A variant's metadata is built only after its `put` returned successfully,
//! so a variant that was never fully stored can never appear in the map.

use crate::store::{ObjectStore, StoreError};
use crate::types::{GeneratedVariant, VariantMetadata};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to publish {filename}: {source}")]
pub struct PublishError {
    pub filename: String,
    #[source]
    pub source: StoreError,
}

/// Uploads variants and derives their public URLs.
pub struct Publisher<'a> {
    store: &'a dyn ObjectStore,
    url_base: String,
}

impl<'a> Publisher<'a> {
    /// `url_base` is the public prefix variants are served under, e.g.
    /// `/api/media/file` or a bucket's public origin.
    pub fn new(store: &'a dyn ObjectStore, url_base: impl Into<String>) -> Self {
        Self {
            store,
            url_base: url_base.into(),
        }
    }

    /// Public URL for a stored key: `{url_base}/{filename}`.
    pub fn url_for(&self, filename: &str) -> String {
        let base = self.url_base.trim_end_matches('/');
        format!("{base}/{filename}")
    }

    /// Upload one variant under its filename. Tried exactly once.
    pub fn publish(&self, variant: &GeneratedVariant) -> Result<VariantMetadata, PublishError> {
        self.store
            .put(&variant.filename, &variant.bytes, &variant.mime_type)
            .map_err(|source| PublishError {
                filename: variant.filename.clone(),
                source,
            })?;

        Ok(assemble(variant, self.url_for(&variant.filename)))
    }
}

/// Metadata entry for a variant stored at `url`.
pub fn assemble(variant: &GeneratedVariant, url: String) -> VariantMetadata {
    VariantMetadata {
        url,
        width: variant.width,
        height: variant.height,
        mime_type: variant.mime_type.clone(),
        file_size: variant.bytes.len() as u64,
        filename: variant.filename.clone(),
    }
}
