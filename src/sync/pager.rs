//! Paginated listing of the remote database.

use crate::remote::{QueryFilter, RemoteEntry, RemoteStore};
use crate::sync::report::{SilentReporter, SyncReporter};
use crate::sync::retry::RetryPolicy;
use crate::sync::types::{SyncError, SyncResult};

/// Lists a database one page request at a time.
pub struct RemoteQueryPager<'a, S: ?Sized> {
    store: &'a S,
    database_id: &'a str,
    policy: &'a RetryPolicy,
    reporter: &'a dyn SyncReporter,
}

impl<'a, S: RemoteStore + ?Sized> RemoteQueryPager<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, database_id: &'a str, policy: &'a RetryPolicy) -> Self {
        Self {
            store,
            database_id,
            policy,
            reporter: &SilentReporter,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: &'a dyn SyncReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Iterate every entry matching `filter`, or every entry if `None`.
    ///
    /// Pages are fetched lazily. The iterator cannot be restarted; call
    /// `list` again for a fresh listing.
    #[must_use]
    pub fn list(&self, filter: Option<QueryFilter>) -> QueryPager<'a, S> {
        QueryPager {
            store: self.store,
            database_id: self.database_id,
            policy: self.policy,
            reporter: self.reporter,
            filter,
            cursor: None,
            buffer: Vec::new().into_iter(),
            pages_fetched: 0,
            done: false,
        }
    }
}

/// One-shot iterator over a listing.
///
/// Yields `Err(SyncError::RemoteUnavailable)` once if a page request fails
/// on every attempt, then ends.
pub struct QueryPager<'a, S: ?Sized> {
    store: &'a S,
    database_id: &'a str,
    policy: &'a RetryPolicy,
    reporter: &'a dyn SyncReporter,
    filter: Option<QueryFilter>,
    cursor: Option<String>,
    buffer: std::vec::IntoIter<RemoteEntry>,
    pages_fetched: usize,
    done: bool,
}

impl<S: ?Sized> QueryPager<'_, S> {
    /// Page requests that succeeded so far.
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl<S: RemoteStore + ?Sized> Iterator for QueryPager<'_, S> {
    type Item = SyncResult<RemoteEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.buffer.next() {
                return Some(Ok(entry));
            }
            if self.done {
                return None;
            }

            let result = self.policy.run("query", self.reporter, |_| {
                self.store
                    .query(self.database_id, self.filter.as_ref(), self.cursor.as_deref())
            });

            match result {
                Ok(page) => {
                    self.pages_fetched += 1;
                    tracing::trace!(
                        page = self.pages_fetched,
                        entries = page.entries.len(),
                        has_more = page.has_more,
                        "Fetched listing page"
                    );
                    self.buffer = page.entries.into_iter();
                    match page.next_cursor {
                        Some(cursor) if page.has_more => self.cursor = Some(cursor),
                        _ => self.done = true,
                    }
                }
                Err(exhausted) => {
                    self.done = true;
                    self.buffer = Vec::new().into_iter();
                    return Some(Err(SyncError::RemoteUnavailable {
                        attempts: exhausted.attempts,
                        source: exhausted.error,
                    }));
                }
            }
        }
    }
}
