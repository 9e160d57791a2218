//! Sync event reporting.
//!
//! The batch runner and the upsert coordinator describe what they do as
//! [`SyncEvent`]s handed to a [`SyncReporter`]. Where the events end up (log
//! output, a progress line, a test assertion) is up to the reporter.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::sync::types::BatchReport;

/// Something that happened during a sync run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    BatchStarted {
        total: usize,
    },
    RecordCreated {
        name: String,
        identity_key: String,
        page_id: String,
    },
    RecordSkipped {
        name: String,
        identity_key: String,
        page_id: String,
    },
    RecordFailed {
        name: String,
        identity_key: String,
        kind: String,
        cause: String,
    },
    RetryScheduled {
        operation: String,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    DuplicateIdentity {
        identity_key: String,
        count: usize,
    },
    BatchCompleted {
        report: BatchReport,
    },
}

/// Receiver of sync events.
pub trait SyncReporter {
    fn report(&self, event: SyncEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl SyncReporter for SilentReporter {
    fn report(&self, _event: SyncEvent) {}
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn report(&self, event: SyncEvent) {
        match event {
            SyncEvent::BatchStarted { total } => info!(total, "Starting import"),
            SyncEvent::RecordCreated {
                name,
                identity_key,
                page_id,
            } => debug!(%name, %identity_key, %page_id, "Created page"),
            SyncEvent::RecordSkipped {
                name,
                identity_key,
                page_id,
            } => debug!(%name, %identity_key, %page_id, "Already present, skipped"),
            SyncEvent::RecordFailed {
                name,
                identity_key,
                kind,
                cause,
            } => warn!(%name, %identity_key, %kind, "Failed to write recipe: {cause}"),
            SyncEvent::RetryScheduled {
                operation,
                attempt,
                delay,
                error,
            } => warn!(
                %operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Remote call failed, retrying: {error}"
            ),
            SyncEvent::DuplicateIdentity {
                identity_key,
                count,
            } => error!(%identity_key, count, "Multiple pages share one identity key"),
            SyncEvent::BatchCompleted { report } => info!(
                created = report.created,
                skipped = report.skipped,
                failed = report.failed.len(),
                "Import finished"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectingReporter {
    /// Events received so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl SyncReporter for CollectingReporter {
    fn report(&self, event: SyncEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::default();
        reporter.report(SyncEvent::BatchStarted { total: 2 });
        reporter.report(SyncEvent::DuplicateIdentity {
            identity_key: "h1".into(),
            count: 2,
        });

        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SyncEvent::BatchStarted { total: 2 });
    }

    #[test]
    fn test_tracing_reporter_accepts_every_event() {
        let reporter = TracingReporter;
        reporter.report(SyncEvent::BatchStarted { total: 1 });
        reporter.report(SyncEvent::RetryScheduled {
            operation: "query".into(),
            attempt: 1,
            delay: Duration::from_millis(10),
            error: "Network error: reset".into(),
        });
        reporter.report(SyncEvent::BatchCompleted {
            report: BatchReport::default(),
        });
    }
}
