//! Sync types: outcomes, batch reports and errors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::remote::{RemoteEntry, RemoteError};

/// Result of upserting one recipe.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No page carried the identity key; this page was created.
    Created(RemoteEntry),
    /// A page with the identity key already exists.
    Skipped(RemoteEntry),
    /// The lookup or the create failed. The batch carries on.
    Error(SyncError),
}

impl Outcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Skipped(_) => "skipped",
            Self::Error(_) => "error",
        }
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of pages created.
    pub created: usize,
    /// Number of recipes already present.
    pub skipped: usize,
    /// Recipes that could not be written.
    pub failed: Vec<FailedRecord>,
}

impl BatchReport {
    /// Total records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed.len()
    }

    /// Returns true if every record was created or skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A recipe that failed, with enough detail to retry it alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecord {
    /// Recipe title, or the file path when the file could not be read.
    pub name: String,
    /// Identity key of the recipe, empty if it never loaded.
    pub identity_key: String,
    /// File the recipe was loaded from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Machine-readable failure kind.
    pub kind: String,
    /// Human-readable cause.
    pub cause: String,
    /// ISO8601 time the failure was recorded.
    pub failed_at: String,
}

impl FailedRecord {
    #[must_use]
    pub fn new(name: &str, identity_key: &str, error: &SyncError) -> Self {
        Self {
            name: name.to_string(),
            identity_key: identity_key.to_string(),
            source: None,
            kind: error.kind().to_string(),
            cause: error.to_string(),
            failed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }
}

/// A recipe that cannot be mapped to a Notion page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Recipe has no title")]
    EmptyTitle,

    #[error("Recipe has no content hash")]
    MissingHash,

    #[error("Tag '{tag}' contains a comma, which Notion does not allow in select options")]
    InvalidTag { tag: String },

    #[error("Field '{field}' contains a NUL character")]
    ControlCharacter { field: &'static str },
}

/// Sync-specific errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// The recipe could not be transformed.
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    /// A listing page kept failing.
    #[error("Remote store unavailable after {attempts} attempts: {source}")]
    RemoteUnavailable {
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    /// The create call kept failing.
    #[error("Create failed after {attempts} attempts: {source}")]
    CreateFailed {
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    /// More than one page carries the same identity key.
    #[error("{count} pages share identity key {key}: {}", .entry_ids.join(", "))]
    DuplicateIdentity {
        key: String,
        count: usize,
        entry_ids: Vec<String>,
    },
}

impl SyncError {
    /// Machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transform(_) => "transform",
            Self::RemoteUnavailable { .. } => "remote_unavailable",
            Self::CreateFailed { .. } => "create_failed",
            Self::DuplicateIdentity { .. } => "duplicate_identity",
        }
    }

    /// Whether the error means the remote store is inconsistent and the
    /// batch must stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DuplicateIdentity { .. })
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
