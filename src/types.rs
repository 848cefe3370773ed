//! Shared types that flow between pipeline stages.
//!
//! [`GeneratedVariant`] lives only between encode and publish.
//! [`VariantMetadataMap`] is the one output that outlives a pipeline run: it is
//! serialized to JSON (camelCase keys) and stored verbatim on the owning
//! media record, so its shape is a compatibility contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One encoded variant, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVariant {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filename: String,
    pub mime_type: String,
}

/// Persisted description of one published variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetadata {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub file_size: u64,
    pub filename: String,
}

/// Variant name → metadata. May hold fewer entries than the catalog when
/// individual variants failed; consumers must tolerate missing keys.
pub type VariantMetadataMap = BTreeMap<String, VariantMetadata>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_camel_case() {
        let meta = VariantMetadata {
            url: "/api/media/file/page-1-avatar.png".into(),
            width: 200,
            height: 200,
            mime_type: "image/png".into(),
            file_size: 1234,
            filename: "page-1-avatar.png".into(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["fileSize"], 1234);
        assert!(json.get("mime_type").is_none());
    }

    #[test]
    fn metadata_map_parses_stored_json() {
        let json = r#"{
            "thumbnail": {
                "url": "/api/media/file/a-thumbnail.jpg",
                "width": 400,
                "height": 300,
                "mimeType": "image/jpeg",
                "fileSize": 5120,
                "filename": "a-thumbnail.jpg"
            }
        }"#;
        let map: VariantMetadataMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["thumbnail"].height, 300);
    }
}
