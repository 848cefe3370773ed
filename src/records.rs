//! Media records: the CMS-side rows that own a variant metadata map.
//!
//! The pipeline never owns records; it reads them to find originals and
//! writes exactly one field back (`imageSizes`). [`MediaRepository`] is that
//! narrow seam. [`JsonRecordFile`] backs it with a JSON array on disk for the
//! CLI; [`MemoryRepository`] is the in-process version.
//!
//! ```json
//! [
//!   { "id": "42", "filename": "page-12.png", "mimeType": "image/png", "imageSizes": {} }
//! ]
//! ```

use crate::types::VariantMetadataMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no media record with id {0:?}")]
    NotFound(String),
}

/// One uploaded media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,
    /// Object-store key of the original upload.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_sizes: VariantMetadataMap,
}

impl MediaRecord {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: Some(filename.into()),
            mime_type: None,
            image_sizes: VariantMetadataMap::new(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn has_image_sizes(&self) -> bool {
        !self.image_sizes.is_empty()
    }
}

// Records written before variants existed carry `"imageSizes": null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<VariantMetadataMap, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<VariantMetadataMap>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Read/write access to media records.
pub trait MediaRepository {
    /// Every record, in storage order.
    fn records(&self) -> Result<Vec<MediaRecord>, RepositoryError>;

    fn get(&self, id: &str) -> Result<Option<MediaRecord>, RepositoryError> {
        Ok(self.records()?.into_iter().find(|r| r.id == id))
    }

    /// Replace a record's variant map. Unknown ids are [`RepositoryError::NotFound`].
    fn update_image_sizes(
        &self,
        id: &str,
        sizes: &VariantMetadataMap,
    ) -> Result<(), RepositoryError>;

    /// Remove a record. Unknown ids are [`RepositoryError::NotFound`].
    fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// In-memory repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Mutex<Vec<MediaRecord>>,
}

impl MemoryRepository {
    pub fn new(records: Vec<MediaRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl MediaRepository for MemoryRepository {
    fn records(&self) -> Result<Vec<MediaRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn update_image_sizes(
        &self,
        id: &str,
        sizes: &VariantMetadataMap,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        set_image_sizes(&mut records, id, sizes)
    }

    fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        remove_record(&mut records, id)
    }
}

/// Records persisted as a JSON array. Every mutation rewrites the file.
#[derive(Debug)]
pub struct JsonRecordFile {
    path: PathBuf,
    records: Mutex<Vec<MediaRecord>>,
}

impl JsonRecordFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| RepositoryError::Io {
            path: path.clone(),
            source,
        })?;
        let records: Vec<MediaRecord> = serde_json::from_str(&content)?;
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, records: &[MediaRecord]) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.partial");
        let io_err = |source| RepositoryError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl MediaRepository for JsonRecordFile {
    fn records(&self) -> Result<Vec<MediaRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn update_image_sizes(
        &self,
        id: &str,
        sizes: &VariantMetadataMap,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        set_image_sizes(&mut records, id, sizes)?;
        self.save(&records)
    }

    fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        remove_record(&mut records, id)?;
        self.save(&records)
    }
}

fn set_image_sizes(
    records: &mut [MediaRecord],
    id: &str,
    sizes: &VariantMetadataMap,
) -> Result<(), RepositoryError> {
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
    record.image_sizes = sizes.clone();
    Ok(())
}

fn remove_record(records: &mut Vec<MediaRecord>, id: &str) -> Result<(), RepositoryError> {
    let index = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
    records.remove(index);
    Ok(())
}
