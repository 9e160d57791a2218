//! Recipe file loading.
//!
//! Reads Paprika recipes from disk. Supported formats, chosen by extension:
//!
//! - `.paprikarecipe` - gzip-compressed JSON, as found inside a Paprika
//!   `.paprikarecipes` export once it has been unzipped
//! - `.json` - plain JSON
//! - `.yaml` / `.yml` - YAML
//!
//! A directory is scanned non-recursively, in file name order. Files with
//! other extensions are ignored.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::model::SourceRecord;

/// Extensions [`load_path`] picks up when scanning a directory.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["paprikarecipe", "json", "yaml", "yml"];

/// A recipe file that could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No such file or directory: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported recipe file: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recipe JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid recipe YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    /// The file the error is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::UnsupportedFormat { path }
            | Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::Yaml { path, .. } => path,
        }
    }

    /// Machine-readable kind, used in failure reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Io { .. } => "load_io",
            Self::Json { .. } | Self::Yaml { .. } => "load_parse",
        }
    }
}

/// Recipe file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PaprikaRecipe,
    Json,
    Yaml,
}

impl Format {
    /// Format implied by the file extension, if supported.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "paprikarecipe" => Some(Self::PaprikaRecipe),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Outcome of loading one file found by [`load_path`].
#[derive(Debug)]
pub struct Loaded {
    pub path: PathBuf,
    pub record: Result<SourceRecord, LoadError>,
}

/// Load one recipe file.
///
/// # Errors
///
/// Returns a [`LoadError`] if the extension is unsupported, the file cannot
/// be read, or its content is not a recipe.
pub fn load_file(path: &Path) -> Result<SourceRecord, LoadError> {
    let format = Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);

    match format {
        Format::PaprikaRecipe => {
            let mut json = Vec::new();
            GzDecoder::new(reader)
                .read_to_end(&mut json)
                .map_err(|source| io_error(path, source))?;
            serde_json::from_slice(&json).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        Format::Json => serde_json::from_reader(reader).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Format::Yaml => serde_yaml::from_reader(reader).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a recipe file, or every supported file in a directory.
///
/// Per-file failures are returned alongside the successes so one bad file
/// does not hide the rest.
///
/// # Errors
///
/// Returns a [`LoadError`] if `path` does not exist or the directory cannot
/// be listed.
pub fn load_path(path: &Path) -> Result<Vec<Loaded>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if !path.is_dir() {
        return Ok(vec![Loaded {
            path: path.to_path_buf(),
            record: load_file(path),
        }]);
    }

    let files = recipe_files(path)?;
    tracing::info!(dir = %path.display(), count = files.len(), "Found recipe files");

    Ok(files
        .into_iter()
        .map(|file| {
            tracing::debug!(path = %file.display(), "Loading recipe");
            let record = load_file(&file);
            Loaded { path: file, record }
        })
        .collect())
}

/// Supported files directly inside `dir`, sorted by name.
fn recipe_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        if path.is_file() && Format::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}
