//! Failure report files.
//!
//! Failed records of an import are written as JSONL, one [`FailedRecord`]
//! per line, so a later run can be limited to just those recipes:
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Line-numbered parse errors on read

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::sync::types::FailedRecord;

/// Write content to a file atomically.
///
/// The content goes to a sibling `.tmp` file which is synced to disk and
/// then renamed over `path`. If any step fails, the original file (if any)
/// remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("jsonl.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Write failed records to a JSONL file atomically, replacing it.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized or the file cannot be
/// written.
pub fn write_failures(path: &Path, failures: &[FailedRecord]) -> Result<()> {
    let mut content = String::new();
    for failure in failures {
        content.push_str(&serde_json::to_string(failure)?);
        content.push('\n');
    }
    atomic_write(path, &content)
}

/// Read failed records from a JSONL file. Blank lines are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a failed
/// record; the message carries the 1-based line number.
pub fn read_failures(path: &Path) -> Result<Vec<FailedRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut failures = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let failure: FailedRecord = serde_json::from_str(&line).map_err(|e| {
            Error::InvalidArgument(format!("{}:{}: {e}", path.display(), line_num + 1))
        })?;
        failures.push(failure);
    }

    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::{SyncError, TransformError};
    use tempfile::TempDir;

    fn failure(name: &str, key: &str) -> FailedRecord {
        FailedRecord::new(name, key, &SyncError::Transform(TransformError::EmptyTitle))
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("failed.jsonl");

        atomic_write(&path, "line 1\nline 2\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line 1\nline 2\n");
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_failures_survive_a_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("failed.jsonl");
        let written = vec![failure("Soup", "h1"), failure("Stew", "h2")];

        write_failures(&path, &written).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        assert_eq!(read_failures(&path).unwrap(), written);
    }

    #[test]
    fn test_rewrite_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("failed.jsonl");

        write_failures(&path, &[failure("Soup", "h1"), failure("Stew", "h2")]).unwrap();
        write_failures(&path, &[]).unwrap();

        assert!(read_failures(&path).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("failed.jsonl");
        let good = serde_json::to_string(&failure("Soup", "h1")).unwrap();
        fs::write(&path, format!("{good}\n\nnot json\n")).unwrap();

        let err = read_failures(&path).unwrap_err();
        assert!(err.to_string().contains(":3:"), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_failures(Path::new("/nonexistent/failed.jsonl"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
