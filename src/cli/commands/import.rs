//! Import command implementation.
//!
//! Loads recipe files, then creates one Notion page per recipe whose content
//! hash is not in the database yet. Re-running an import is safe: recipes
//! imported before are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::{info, warn};

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::loader::{self, Loaded};
use crate::model::SourceRecord;
use crate::remote::{DryRunStore, NotionStore, RemoteStore};
use crate::sync::{
    self, read_failures, write_failures, BatchReport, BatchRunner, FailedRecord, TracingReporter,
    UpsertCoordinator,
};

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the path cannot be read,
/// two pages share a recipe's hash, or any recipe failed to import.
pub fn execute(args: &ImportArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let database_id = config.require_database_id(args.database_id.as_deref())?;
    let token = config.require_token()?;

    let mut loaded = loader::load_path(&args.path)?;
    if let Some(only_failed) = &args.only_failed {
        let previous = read_failures(only_failed)?;
        loaded = retain_failed(loaded, &previous);
        info!(count = loaded.len(), "Limiting import to previously failed recipes");
    }
    let (records, load_failures) = split_loaded(loaded);

    let notion = NotionStore::new(
        &config.api_url,
        token,
        &config.properties.identity,
        config.timeout,
    )?
    .with_page_size(config.page_size);

    let report = if args.dry_run {
        let store = DryRunStore::new(notion, &config.properties);
        let report = run_batch(&store, &config, database_id, records, load_failures)?;
        info!(would_create = store.would_create(), "Dry run finished, nothing was written");
        report
    } else {
        run_batch(&notion, &config, database_id, records, load_failures)?
    };

    if let Some(path) = &args.failures {
        write_failures(path, &report.failed)?;
    }

    print_report(&report, database_id, args.dry_run, json)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(Error::PartialFailure {
            failed: report.failed.len(),
            total: report.total(),
            failures_file: args.failures.clone(),
        })
    }
}

fn run_batch<S: RemoteStore>(
    store: &S,
    config: &Config,
    database_id: &str,
    records: Vec<(PathBuf, SourceRecord)>,
    load_failures: Vec<FailedRecord>,
) -> Result<BatchReport> {
    let reporter = TracingReporter;
    let coordinator = UpsertCoordinator::new(store, database_id)
        .with_names(config.properties.clone())
        .with_policy(config.retry.clone())
        .with_reporter(&reporter);
    let runner = BatchRunner::new(coordinator);

    let mut report = runner.run_files(records)?;
    for failure in load_failures {
        runner.record_failure(&mut report, failure);
    }
    Ok(report)
}

/// Separate loaded recipes from files that failed to load.
///
/// Recipes whose stored hash no longer matches their content are still
/// imported under the stored hash; the mismatch is only logged.
fn split_loaded(loaded: Vec<Loaded>) -> (Vec<(PathBuf, SourceRecord)>, Vec<FailedRecord>) {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for Loaded { path, record } in loaded {
        match record {
            Ok(record) => {
                if !sync::verify(&record).unwrap_or(false) {
                    warn!(
                        path = %path.display(),
                        hash = %record.hash,
                        "Content hash does not match recipe content"
                    );
                }
                records.push((path, record));
            }
            Err(error) => {
                warn!(path = %path.display(), "Unable to read recipe: {error}");
                failures.push(FailedRecord {
                    name: path.display().to_string(),
                    identity_key: String::new(),
                    source: Some(path),
                    kind: error.kind().to_string(),
                    cause: error.to_string(),
                    failed_at: chrono::Utc::now().to_rfc3339(),
                });
            }
        }
    }

    (records, failures)
}

/// Keep only files or recipes that appear in a previous failures report,
/// matched by source file or by identity key.
fn retain_failed(loaded: Vec<Loaded>, previous: &[FailedRecord]) -> Vec<Loaded> {
    let keys: HashSet<&str> = previous
        .iter()
        .map(|f| f.identity_key.as_str())
        .filter(|k| !k.is_empty())
        .collect();
    let sources: HashSet<&Path> = previous.iter().filter_map(|f| f.source.as_deref()).collect();

    loaded
        .into_iter()
        .filter(|l| {
            sources.contains(l.path.as_path())
                || l.record
                    .as_ref()
                    .is_ok_and(|r| keys.contains(r.hash.as_str()))
        })
        .collect()
}

fn print_report(report: &BatchReport, database_id: &str, dry_run: bool, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "success": report.is_clean(),
            "dry_run": dry_run,
            "database_id": database_id,
            "created": report.created,
            "skipped": report.skipped,
            "failed": report.failed,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if dry_run {
        println!("{}", "Dry run: no pages were created".yellow());
    }
    println!("Import into database {database_id}");
    println!();
    let created_label = if dry_run { "Would create:" } else { "Created:" };
    println!("  {:<13} {}", created_label, report.created.to_string().green());
    println!("  {:<13} {}", "Skipped:", report.skipped);
    if report.failed.is_empty() {
        println!("  {:<13} 0", "Failed:");
    } else {
        println!("  {:<13} {}", "Failed:", report.failed.len().to_string().red());
        for failure in &report.failed {
            println!(
                "    {} {} {}",
                "✗".red(),
                failure.name.bold(),
                format!("[{}] {}", failure.kind, failure.cause).dimmed()
            );
        }
    }
    println!();
    println!("  Total: {} recipes", report.total());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadError;
    use crate::remote::MemoryStore;
    use crate::sync::{with_recomputed_hash, SyncError};

    fn loaded_ok(path: &str, hash: &str) -> Loaded {
        let mut record = SourceRecord::new("Soup");
        record.hash = hash.into();
        Loaded {
            path: PathBuf::from(path),
            record: Ok(record),
        }
    }

    fn loaded_err(path: &str) -> Loaded {
        Loaded {
            path: PathBuf::from(path),
            record: Err(LoadError::UnsupportedFormat {
                path: PathBuf::from(path),
            }),
        }
    }

    #[test]
    fn test_split_loaded_turns_errors_into_failures() {
        let record = with_recomputed_hash(&SourceRecord::new("Soup")).unwrap();
        let loaded = vec![
            Loaded {
                path: PathBuf::from("soup.json"),
                record: Ok(record.clone()),
            },
            loaded_err("broken.paprikarecipe"),
        ];

        let (records, failures) = split_loaded(loaded);
        assert_eq!(records, vec![(PathBuf::from("soup.json"), record)]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "broken.paprikarecipe");
        assert_eq!(
            failures[0].source.as_deref(),
            Some(Path::new("broken.paprikarecipe"))
        );
        assert_eq!(failures[0].kind, "unsupported_format");
        assert!(failures[0].identity_key.is_empty());
    }

    #[test]
    fn test_retain_failed_matches_hash_or_path() {
        let previous = vec![
            FailedRecord::new(
                "Soup",
                "h2",
                &SyncError::Transform(crate::sync::TransformError::EmptyTitle),
            ),
            FailedRecord {
                name: "broken.paprikarecipe".into(),
                identity_key: String::new(),
                source: Some(PathBuf::from("broken.paprikarecipe")),
                kind: "load_parse".into(),
                cause: "bad".into(),
                failed_at: String::new(),
            },
        ];
        let loaded = vec![
            loaded_ok("a.json", "h1"),
            loaded_ok("b.json", "h2"),
            loaded_err("broken.paprikarecipe"),
            loaded_ok("c.json", ""),
        ];

        let kept: Vec<_> = retain_failed(loaded, &previous)
            .into_iter()
            .map(|l| l.path)
            .collect();
        assert_eq!(
            kept,
            vec![PathBuf::from("b.json"), PathBuf::from("broken.paprikarecipe")]
        );
    }

    #[test]
    fn test_run_batch_merges_load_failures() {
        let store = MemoryStore::new();
        let config = Config {
            retry: crate::sync::RetryPolicy::no_retry(),
            ..Config::default()
        };
        let mut record = SourceRecord::new("Soup");
        record.hash = "h1".into();
        let (_, load_failures) = split_loaded(vec![loaded_err("x.yaml")]);

        let records = vec![(PathBuf::from("soup.json"), record)];
        let report = run_batch(&store, &config, "db", records, load_failures).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_unhashed_recipe_can_be_retried_from_its_file() {
        let store = MemoryStore::new();
        let config = Config {
            retry: crate::sync::RetryPolicy::no_retry(),
            ..Config::default()
        };
        let path = PathBuf::from("recipes/soup.json");
        let records = vec![(path.clone(), SourceRecord::new("Soup"))];

        let report = run_batch(&store, &config, "db", records, Vec::new()).unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].kind, "transform");
        assert!(report.failed[0].identity_key.is_empty());

        let loaded = vec![
            Loaded {
                path: path.clone(),
                record: Ok(SourceRecord::new("Soup")),
            },
            loaded_ok("recipes/bread.json", "h9"),
        ];
        let kept: Vec<_> = retain_failed(loaded, &report.failed)
            .into_iter()
            .map(|l| l.path)
            .collect();
        assert_eq!(kept, vec![path]);
    }
}
