//! Paprika recipe model.
//!
//! A `SourceRecord` is one recipe as exported by the Paprika app. The field set
//! mirrors the export format exactly so that the stored `hash` can be
//! recomputed from the remaining fields (see [`crate::sync::fingerprint`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recipe from a Paprika export.
///
/// Every field defaults to its empty value so partial exports still load.
/// Fields the exporter adds in the future are kept in `extra` and take part
/// in the fingerprint like any other field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    /// Category tags assigned in Paprika.
    pub categories: Vec<String>,
    pub cook_time: String,
    /// Creation timestamp as written by the exporter (`YYYY-MM-DD HH:MM:SS`).
    pub created: String,
    pub description: String,
    pub difficulty: String,
    /// Free-text directions.
    pub directions: String,
    /// SHA256 content hash computed by the exporter.
    pub hash: String,
    pub image_url: String,
    /// Free-text ingredient list, one ingredient per line.
    pub ingredients: String,
    /// Recipe title.
    pub name: String,
    pub notes: String,
    pub nutritional_info: String,
    pub photo: String,
    pub photo_hash: String,
    pub photo_large: Value,
    pub prep_time: String,
    pub rating: i64,
    pub servings: String,
    pub source: String,
    pub source_url: String,
    pub total_time: String,
    pub uid: String,
    pub photos: Vec<Value>,
    pub photo_data: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SourceRecord {
    /// Create a record with a title and no other content.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Short label used in logs and failure reports.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "<untitled>"
        } else {
            &self.name
        }
    }
}

impl std::fmt::Display for SourceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
