//! Error types for the paprika2notion CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=config, 3=load, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::loader::LoadError;
use crate::sync::SyncError;

/// Result type alias for paprika2notion operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Config (exit 2)
    ConfigError,
    MissingToken,
    MissingDatabaseId,

    // Load (exit 3)
    LoadError,
    HashMismatch,

    // Validation (exit 4)
    InvalidArgument,

    // Remote (exit 5)
    HttpError,
    RemoteUnavailable,

    // Sync (exit 6)
    DuplicateIdentity,
    PartialFailure,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingToken => "MISSING_TOKEN",
            Self::MissingDatabaseId => "MISSING_DATABASE_ID",
            Self::LoadError => "LOAD_ERROR",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::HttpError => "HTTP_ERROR",
            Self::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Self::DuplicateIdentity => "DUPLICATE_IDENTITY",
            Self::PartialFailure => "PARTIAL_FAILURE",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::ConfigError | Self::MissingToken | Self::MissingDatabaseId => 2,
            Self::LoadError | Self::HashMismatch => 3,
            Self::InvalidArgument => 4,
            Self::HttpError | Self::RemoteUnavailable => 5,
            Self::DuplicateIdentity | Self::PartialFailure => 6,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether running the same command again may succeed.
    ///
    /// True for transient remote failures and for partial batches, whose
    /// failed records are retried on the next run while the rest are skipped.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HttpError | Self::RemoteUnavailable | Self::PartialFailure
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in paprika2notion operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No Notion token configured")]
    MissingToken,

    #[error("No recipe database configured")]
    MissingDatabaseId,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{mismatched} of {total} recipes have a stale content hash")]
    HashMismatch { mismatched: usize, total: usize },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("{failed} of {total} recipes failed to import")]
    PartialFailure {
        failed: usize,
        total: usize,
        /// Where the failed records were written, if anywhere.
        failures_file: Option<PathBuf>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingToken => ErrorCode::MissingToken,
            Self::MissingDatabaseId => ErrorCode::MissingDatabaseId,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Http(_) => ErrorCode::HttpError,
            Self::Load(_) => ErrorCode::LoadError,
            Self::HashMismatch { .. } => ErrorCode::HashMismatch,
            Self::Sync(SyncError::DuplicateIdentity { .. }) => ErrorCode::DuplicateIdentity,
            Self::Sync(SyncError::RemoteUnavailable { .. } | SyncError::CreateFailed { .. }) => {
                ErrorCode::RemoteUnavailable
            }
            Self::Sync(SyncError::Transform(_)) | Self::InvalidArgument(_) => {
                ErrorCode::InvalidArgument
            }
            Self::PartialFailure { .. } => ErrorCode::PartialFailure,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingToken => Some(
                "Set NOTION_TOKEN or add \"token\" to ~/.paprika2notion/config.json".to_string(),
            ),

            Self::MissingDatabaseId => Some(
                "Pass --database-id, set NOTION_RECIPE_DB_ID, \
                 or add \"database_id\" to ~/.paprika2notion/config.json"
                    .to_string(),
            ),

            Self::HashMismatch { .. } => Some(
                "The files were edited after export. Re-export them from Paprika, \
                 or import anyway: the stored hash is still used as the identity key"
                    .to_string(),
            ),

            Self::Sync(SyncError::DuplicateIdentity { key, entry_ids, .. }) => Some(format!(
                "Archive all but one of the pages with Paprika Hash '{key}' ({}) and run the import again",
                entry_ids.join(", ")
            )),

            Self::Sync(SyncError::RemoteUnavailable { .. } | SyncError::CreateFailed { .. }) => {
                Some("Notion did not respond; check the network and run the import again".to_string())
            }

            Self::PartialFailure {
                failures_file: Some(path),
                ..
            } => Some(format!(
                "Failed records were written to {}. Running the import again retries them.",
                path.display()
            )),
            Self::PartialFailure { .. } => Some(
                "Running the import again retries the failed records; already imported recipes are skipped"
                    .to_string(),
            ),

            Self::Load(LoadError::UnsupportedFormat { .. }) => Some(
                "Supported formats: .paprikarecipe, .json, .yaml, .yml".to_string(),
            ),

            Self::Config(_)
            | Self::Http(_)
            | Self::Load(_)
            | Self::Sync(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
