//! In-memory page store.
//!
//! Paginates like the real API and can be told to fail upcoming calls, which
//! makes it the store of choice for exercising the retry and duplicate
//! handling of the sync core.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{QueryFilter, QueryPage, RemoteEntry, RemoteError, RemoteResult, RemoteStore};
use crate::model::{PageProperties, PropertyNames};

/// A page held by the store.
#[derive(Debug, Clone)]
struct StoredPage {
    database_id: String,
    entry: RemoteEntry,
    properties: PageProperties,
}

#[derive(Debug, Default)]
struct Inner {
    pages: Vec<StoredPage>,
    query_failures: VecDeque<RemoteError>,
    create_failures: VecDeque<RemoteError>,
    query_calls: usize,
    create_calls: usize,
}

/// In-process [`RemoteStore`].
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    page_size: usize,
    identity_property: String,
    ignore_filter: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with a page size of 100 and the default identity column.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size: 100,
            identity_property: PropertyNames::default().identity,
            ignore_filter: false,
        }
    }

    /// Set how many entries one query call returns.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the column read back as the identity key.
    #[must_use]
    pub fn with_identity_property(mut self, property: impl Into<String>) -> Self {
        self.identity_property = property.into();
        self
    }

    /// Return every page regardless of the query filter, like a store whose
    /// filter semantics are looser than exact match.
    #[must_use]
    pub fn ignoring_filter(mut self) -> Self {
        self.ignore_filter = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the store from the others.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert an existing page carrying `identity_key`, returning its id.
    pub fn seed(&self, database_id: &str, identity_key: &str) -> String {
        let entry = RemoteEntry {
            id: new_page_id(),
            identity_key: Some(identity_key.to_string()),
            url: None,
            last_edited: None,
        };
        let id = entry.id.clone();
        self.lock().pages.push(StoredPage {
            database_id: database_id.to_string(),
            entry,
            properties: PageProperties::new(),
        });
        id
    }

    /// Fail the next query call with `error`. Calls queue up in order.
    pub fn fail_next_query(&self, error: RemoteError) {
        self.lock().query_failures.push_back(error);
    }

    /// Fail the next create call with `error`. Calls queue up in order.
    pub fn fail_next_create(&self, error: RemoteError) {
        self.lock().create_failures.push_back(error);
    }

    /// Number of query calls received, failed ones included.
    #[must_use]
    pub fn query_calls(&self) -> usize {
        self.lock().query_calls
    }

    /// Number of create calls received, failed ones included.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    /// Number of pages in `database_id`.
    #[must_use]
    pub fn len(&self, database_id: &str) -> usize {
        self.lock()
            .pages
            .iter()
            .filter(|p| p.database_id == database_id)
            .count()
    }

    /// Whether `database_id` has no pages.
    #[must_use]
    pub fn is_empty(&self, database_id: &str) -> bool {
        self.len(database_id) == 0
    }

    /// Property set a page was created with.
    #[must_use]
    pub fn properties(&self, page_id: &str) -> Option<PageProperties> {
        self.lock()
            .pages
            .iter()
            .find(|p| p.entry.id == page_id)
            .map(|p| p.properties.clone())
    }
}

impl RemoteStore for MemoryStore {
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage> {
        let mut inner = self.lock();
        inner.query_calls += 1;
        if let Some(error) = inner.query_failures.pop_front() {
            return Err(error);
        }

        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| RemoteError::Client {
                    status: 400,
                    code: "validation_error".to_string(),
                    message: format!("Invalid start_cursor: {c}"),
                })?,
            None => 0,
        };

        let matching: Vec<&StoredPage> = inner
            .pages
            .iter()
            .filter(|p| p.database_id == database_id)
            .filter(|p| self.ignore_filter || filter.is_none_or(|f| f.matches(&p.entry)))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let entries = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|p| p.entry.clone())
            .collect();
        let has_more = end < matching.len();

        Ok(QueryPage {
            entries,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    fn create(&self, database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry> {
        let mut inner = self.lock();
        inner.create_calls += 1;
        if let Some(error) = inner.create_failures.pop_front() {
            return Err(error);
        }

        let identity_key = properties
            .get(&self.identity_property)
            .and_then(|v| v.as_text())
            .map(String::from);
        let entry = RemoteEntry {
            id: new_page_id(),
            identity_key,
            url: None,
            last_edited: Some(chrono::Utc::now().to_rfc3339()),
        };

        inner.pages.push(StoredPage {
            database_id: database_id.to_string(),
            entry: entry.clone(),
            properties: properties.clone(),
        });

        Ok(entry)
    }
}

fn new_page_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
