//! Verify command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::loader;
use crate::sync;

#[derive(Serialize)]
struct FileCheck {
    path: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    computed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Recompute the content hash of every recipe under `path`.
///
/// # Errors
///
/// Returns [`Error::HashMismatch`] if any stored hash is stale, or the first
/// load error if some files could not be read.
pub fn execute(path: &Path, json: bool) -> Result<()> {
    let mut checks = Vec::new();
    let mut mismatched = 0;
    let mut first_load_error = None;

    for loaded in loader::load_path(path)? {
        let display = loaded.path.display().to_string();
        match loaded.record {
            Ok(record) => {
                let computed = sync::fingerprint(&record)?;
                let ok = computed == record.hash;
                if !ok {
                    mismatched += 1;
                }
                checks.push(FileCheck {
                    path: display,
                    status: if ok { "ok" } else { "mismatch" },
                    stored: Some(record.hash),
                    computed: Some(computed),
                    error: None,
                });
            }
            Err(error) => {
                checks.push(FileCheck {
                    path: display,
                    status: "unreadable",
                    stored: None,
                    computed: None,
                    error: Some(error.to_string()),
                });
                first_load_error.get_or_insert(error);
            }
        }
    }

    if json {
        let output = serde_json::json!({
            "total": checks.len(),
            "mismatched": mismatched,
            "files": checks,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for check in &checks {
            match check.status {
                "ok" => println!("{} {}", "✓".green(), check.path),
                "mismatch" => println!(
                    "{} {} {}",
                    "✗".red(),
                    check.path,
                    format!(
                        "stored {} computed {}",
                        check.stored.as_deref().unwrap_or_default(),
                        check.computed.as_deref().unwrap_or_default()
                    )
                    .dimmed()
                ),
                _ => println!(
                    "{} {} {}",
                    "?".yellow(),
                    check.path,
                    check.error.as_deref().unwrap_or_default().dimmed()
                ),
            }
        }
        println!();
        println!("{} files, {} mismatched", checks.len(), mismatched);
    }

    if mismatched > 0 {
        return Err(Error::HashMismatch {
            mismatched,
            total: checks.len(),
        });
    }
    match first_load_error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
