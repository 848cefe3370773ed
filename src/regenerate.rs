//! Batch regeneration of variants for existing media records.
//!
//! Backfills records uploaded before variant generation existed, or all of
//! them with `force` after the catalog changed. Each record is handled on its
//! own: a missing original or an undecodable file counts as an error for
//! that record and the batch moves on.
//!
//! ```text
//! for record in repository:
//!     has sizes (and !force) → skipped
//!     no filename            → skipped
//!     store.get(filename)    → generate → update_image_sizes → successful
//!     any failure            → errors
//! ```

use crate::generate::{GenerateError, VariantGenerator};
use crate::records::{MediaRecord, MediaRepository, RepositoryError};
use crate::store::{ObjectStore, StoreError};
use serde::Serialize;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Mimetype assumed for records that never stored one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum RegenerateError {
    #[error("original {0} not found in store")]
    MissingOriginal(String),
    #[error("failed to read original: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("failed to update record: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerateOptions {
    /// Regenerate records that already have variants.
    pub force: bool,
}

/// Counts for one batch run. `successful + errors + skipped == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegenerationSummary {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl RegenerationSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Why a record was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyGenerated,
    NoFilename,
}

/// Per-record progress events.
#[derive(Debug, Clone, PartialEq)]
pub enum RegenerateEvent {
    Skipped {
        id: String,
        filename: Option<String>,
        reason: SkipReason,
    },
    Regenerated {
        id: String,
        filename: String,
        variants: usize,
    },
    Failed {
        id: String,
        filename: String,
        reason: String,
    },
}

/// Regenerate variants for every eligible record in `repo`.
///
/// Only failing to list the records aborts the run.
pub fn regenerate_all(
    repo: &dyn MediaRepository,
    store: &dyn ObjectStore,
    generator: &VariantGenerator,
    options: RegenerateOptions,
    events: Option<Sender<RegenerateEvent>>,
) -> Result<RegenerationSummary, RepositoryError> {
    let records = repo.records()?;
    let mut summary = RegenerationSummary {
        total: records.len(),
        ..Default::default()
    };
    tracing::info!(total = summary.total, force = options.force, "starting regeneration");

    for record in &records {
        let event = match skip_reason(record, options) {
            Some(reason) => {
                tracing::debug!(id = %record.id, ?reason, "skipping record");
                summary.skipped += 1;
                RegenerateEvent::Skipped {
                    id: record.id.clone(),
                    filename: record.filename.clone(),
                    reason,
                }
            }
            None => {
                // skip_reason guarantees a filename here
                let filename = record.filename.clone().unwrap_or_default();
                match regenerate_record(repo, store, generator, record, &filename) {
                    Ok(variants) => {
                        summary.successful += 1;
                        RegenerateEvent::Regenerated {
                            id: record.id.clone(),
                            filename,
                            variants,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(id = %record.id, %filename, error = %e, "regeneration failed");
                        summary.errors += 1;
                        RegenerateEvent::Failed {
                            id: record.id.clone(),
                            filename,
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };
        if let Some(tx) = &events {
            let _ = tx.send(event);
        }
    }

    tracing::info!(
        successful = summary.successful,
        errors = summary.errors,
        skipped = summary.skipped,
        "regeneration finished"
    );
    Ok(summary)
}

fn skip_reason(record: &MediaRecord, options: RegenerateOptions) -> Option<SkipReason> {
    if record.has_image_sizes() && !options.force {
        return Some(SkipReason::AlreadyGenerated);
    }
    match record.filename.as_deref() {
        None | Some("") => Some(SkipReason::NoFilename),
        Some(_) => None,
    }
}

fn regenerate_record(
    repo: &dyn MediaRepository,
    store: &dyn ObjectStore,
    generator: &VariantGenerator,
    record: &MediaRecord,
    filename: &str,
) -> Result<usize, RegenerateError> {
    let bytes = store
        .get(filename)?
        .ok_or_else(|| RegenerateError::MissingOriginal(filename.to_string()))?;
    let mime_type = record.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);

    let sizes = generator.generate(&bytes, filename, mime_type)?;
    repo.update_image_sizes(&record.id, &sizes)?;
    Ok(sizes.len())
}
