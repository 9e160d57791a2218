//! Idempotent page creation keyed by content fingerprint.
//!
//! A recipe is written at most once: before creating a page the coordinator
//! lists every page carrying the recipe's identity key. No match means
//! create, one match means skip, and more than one means the database already
//! violates the one-page-per-key rule, which is reported as fatal.

use tracing::debug;

use crate::model::{PropertyNames, TargetRecord};
use crate::remote::{QueryFilter, RemoteEntry, RemoteStore};
use crate::sync::pager::RemoteQueryPager;
use crate::sync::report::{SilentReporter, SyncEvent, SyncReporter};
use crate::sync::retry::RetryPolicy;
use crate::sync::types::{Outcome, SyncError, SyncResult};

/// Creates recipe pages unless they already exist.
pub struct UpsertCoordinator<'a, S: ?Sized> {
    store: &'a S,
    database_id: String,
    names: PropertyNames,
    policy: RetryPolicy,
    reporter: &'a dyn SyncReporter,
}

impl<'a, S: RemoteStore + ?Sized> UpsertCoordinator<'a, S> {
    /// Coordinator with default column names, retry policy and a silent
    /// reporter.
    #[must_use]
    pub fn new(store: &'a S, database_id: impl Into<String>) -> Self {
        Self {
            store,
            database_id: database_id.into(),
            names: PropertyNames::default(),
            policy: RetryPolicy::default(),
            reporter: &SilentReporter,
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: PropertyNames) -> Self {
        self.names = names;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: &'a dyn SyncReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub(crate) fn reporter(&self) -> &'a dyn SyncReporter {
        self.reporter
    }

    /// Create the page for `target` unless one with its identity key exists.
    ///
    /// Lookup and create failures come back as [`Outcome::Error`]. An
    /// existing page is never modified: updating pages whose recipe changed
    /// since `last_edited` is not supported.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DuplicateIdentity`] if two or more pages carry
    /// the identity key. Nothing is written in that case.
    pub fn upsert(&self, target: &TargetRecord) -> SyncResult<Outcome> {
        let mut matches = match self.find_existing(&target.identity_key) {
            Ok(matches) => matches,
            Err(error) => return Ok(Outcome::Error(error)),
        };

        match matches.len() {
            0 => Ok(self.create(target)),
            1 => {
                let existing = matches.remove(0);
                self.reporter.report(SyncEvent::RecordSkipped {
                    name: target.title.clone(),
                    identity_key: target.identity_key.clone(),
                    page_id: existing.id.clone(),
                });
                Ok(Outcome::Skipped(existing))
            }
            count => {
                self.reporter.report(SyncEvent::DuplicateIdentity {
                    identity_key: target.identity_key.clone(),
                    count,
                });
                Err(SyncError::DuplicateIdentity {
                    key: target.identity_key.clone(),
                    count,
                    entry_ids: matches.into_iter().map(|e| e.id).collect(),
                })
            }
        }
    }

    /// Every page whose identity value equals `key` exactly.
    ///
    /// The store filter narrows the listing; each returned entry is checked
    /// again so looser store-side matching cannot produce false hits.
    fn find_existing(&self, key: &str) -> SyncResult<Vec<RemoteEntry>> {
        let filter = QueryFilter::identity(&self.names.identity, key);
        let pager = RemoteQueryPager::new(self.store, &self.database_id, &self.policy)
            .with_reporter(self.reporter);

        let mut matches = Vec::new();
        for entry in pager.list(Some(filter.clone())) {
            let entry = entry?;
            if filter.matches(&entry) {
                matches.push(entry);
            } else {
                debug!(page_id = %entry.id, key, "Ignoring inexact identity match");
            }
        }
        Ok(matches)
    }

    fn create(&self, target: &TargetRecord) -> Outcome {
        let properties = target.to_properties(&self.names);
        let result = self.policy.run("create", self.reporter, |_| {
            self.store.create(&self.database_id, &properties)
        });

        match result {
            Ok(entry) => {
                self.reporter.report(SyncEvent::RecordCreated {
                    name: target.title.clone(),
                    identity_key: target.identity_key.clone(),
                    page_id: entry.id.clone(),
                });
                Outcome::Created(entry)
            }
            Err(exhausted) => Outcome::Error(SyncError::CreateFailed {
                attempts: exhausted.attempts,
                source: exhausted.error,
            }),
        }
    }
}
