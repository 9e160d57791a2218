//! Batch import of recipes.

use std::path::{Path, PathBuf};

use tracing::info_span;

use crate::model::SourceRecord;
use crate::remote::RemoteStore;
use crate::sync::report::{SyncEvent, SyncReporter};
use crate::sync::transform::transform;
use crate::sync::types::{BatchReport, FailedRecord, Outcome, SyncError, SyncResult};
use crate::sync::upsert::UpsertCoordinator;

/// Runs transform and upsert over a collection of recipes.
///
/// Records are processed one at a time, in order. A failing record is noted
/// in the report and the run moves on; only a duplicate identity key stops
/// the run.
pub struct BatchRunner<'a, S: ?Sized> {
    coordinator: UpsertCoordinator<'a, S>,
    reporter: &'a dyn SyncReporter,
}

impl<'a, S: RemoteStore + ?Sized> BatchRunner<'a, S> {
    /// Batch runner reporting to the coordinator's reporter.
    #[must_use]
    pub fn new(coordinator: UpsertCoordinator<'a, S>) -> Self {
        let reporter = coordinator.reporter();
        Self {
            coordinator,
            reporter,
        }
    }

    /// Import every record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DuplicateIdentity`] as soon as one record's key
    /// matches several pages. Records after it are not processed.
    pub fn run<I>(&self, records: I) -> SyncResult<BatchReport>
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        self.run_all(records.into_iter().map(|record| (None, record)))
    }

    /// Import every record, remembering the file each one came from so a
    /// failure can point back to it.
    ///
    /// # Errors
    ///
    /// Same as [`BatchRunner::run`].
    pub fn run_files<I>(&self, records: I) -> SyncResult<BatchReport>
    where
        I: IntoIterator<Item = (PathBuf, SourceRecord)>,
    {
        self.run_all(records.into_iter().map(|(path, record)| (Some(path), record)))
    }

    fn run_all<I>(&self, records: I) -> SyncResult<BatchReport>
    where
        I: Iterator<Item = (Option<PathBuf>, SourceRecord)>,
    {
        self.reporter.report(SyncEvent::BatchStarted {
            total: records.size_hint().0,
        });

        let mut report = BatchReport::default();
        for (source, record) in records {
            self.run_one(&record, source.as_deref(), &mut report)?;
        }

        self.reporter.report(SyncEvent::BatchCompleted {
            report: report.clone(),
        });
        Ok(report)
    }

    /// Add a failure recorded outside the runner (for example, a file that
    /// did not parse) to a report.
    pub fn record_failure(&self, report: &mut BatchReport, failure: FailedRecord) {
        self.reporter.report(SyncEvent::RecordFailed {
            name: failure.name.clone(),
            identity_key: failure.identity_key.clone(),
            kind: failure.kind.clone(),
            cause: failure.cause.clone(),
        });
        report.failed.push(failure);
    }

    fn run_one(
        &self,
        record: &SourceRecord,
        source: Option<&Path>,
        report: &mut BatchReport,
    ) -> SyncResult<()> {
        let span = info_span!("recipe", name = %record.label(), hash = %record.hash);
        let _guard = span.enter();

        let outcome = match transform(record) {
            Ok(target) => self.coordinator.upsert(&target)?,
            Err(error) => Outcome::Error(SyncError::Transform(error)),
        };

        match outcome {
            Outcome::Created(_) => report.created += 1,
            Outcome::Skipped(_) => report.skipped += 1,
            Outcome::Error(error) => {
                let mut failure = FailedRecord::new(record.label(), &record.hash, &error);
                if let Some(path) = source {
                    failure = failure.with_source(path);
                }
                self.record_failure(report, failure);
            }
        }
        Ok(())
    }
}
