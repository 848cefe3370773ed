//! Removing stored variants when their owning record goes away.
//!
//! Every filename in the record's map gets exactly one `delete` call.
//! Failures are collected and logged; they never stop the remaining
//! deletions or the removal of the record itself.

use crate::records::{MediaRepository, RepositoryError};
use crate::store::{ObjectStore, StoreError};
use crate::types::VariantMetadataMap;
use thiserror::Error;

/// Outcome of deleting one record's variants.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Filenames whose delete succeeded.
    pub deleted: Vec<String>,
    /// Filenames whose delete failed, with the cause.
    pub failed: Vec<(String, StoreError)>,
}

impl CleanupReport {
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("no media record with id {0:?}")]
    RecordNotFound(String),
}

/// Delete every stored variant listed in `sizes`.
pub fn delete_variants(store: &dyn ObjectStore, sizes: &VariantMetadataMap) -> CleanupReport {
    let mut report = CleanupReport::default();
    for (name, meta) in sizes {
        match store.delete(&meta.filename) {
            Ok(()) => {
                tracing::debug!(variant = %name, key = %meta.filename, "variant deleted");
                report.deleted.push(meta.filename.clone());
            }
            Err(e) => {
                tracing::warn!(variant = %name, key = %meta.filename, error = %e, "failed to delete variant");
                report.failed.push((meta.filename.clone(), e));
            }
        }
    }
    report
}

/// Delete a record together with its variants.
///
/// The record is removed even when some variant deletes failed; the report
/// says which objects were left behind.
pub fn delete_record(
    repo: &dyn MediaRepository,
    store: &dyn ObjectStore,
    id: &str,
) -> Result<CleanupReport, CleanupError> {
    let record = repo
        .get(id)?
        .ok_or_else(|| CleanupError::RecordNotFound(id.to_string()))?;

    let report = delete_variants(store, &record.image_sizes);
    repo.delete(id)?;
    tracing::info!(
        id,
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "media record deleted"
    );
    Ok(report)
}
