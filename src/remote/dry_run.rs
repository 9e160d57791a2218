//! Read-only wrapper used by `--dry-run`.

use std::sync::Mutex;

use super::{QueryFilter, QueryPage, RemoteEntry, RemoteResult, RemoteStore};
use crate::model::{PageProperties, PropertyNames};

/// Forwards queries to the wrapped store and answers creates locally.
///
/// Created pages are remembered so a later query in the same run sees them,
/// which keeps duplicate recipes inside one export from both reporting
/// "created".
pub struct DryRunStore<S> {
    inner: S,
    identity_property: String,
    created: Mutex<Vec<RemoteEntry>>,
}

impl<S: RemoteStore> DryRunStore<S> {
    #[must_use]
    pub fn new(inner: S, names: &PropertyNames) -> Self {
        Self {
            inner,
            identity_property: names.identity.clone(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Number of creates that would have been sent.
    #[must_use]
    pub fn would_create(&self) -> usize {
        self.created
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |c| c.len())
    }
}

impl<S: RemoteStore> RemoteStore for DryRunStore<S> {
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage> {
        let mut page = self.inner.query(database_id, filter, cursor)?;

        // Local pages go on the last page of a listing.
        if !page.has_more {
            let created = self
                .created
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            page.entries.extend(
                created
                    .iter()
                    .filter(|e| filter.is_none_or(|f| f.matches(e)))
                    .cloned(),
            );
        }

        Ok(page)
    }

    fn create(&self, _database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry> {
        let entry = RemoteEntry {
            id: format!("dry-run-{}", uuid::Uuid::new_v4()),
            identity_key: properties
                .get(&self.identity_property)
                .and_then(|v| v.as_text())
                .map(String::from),
            url: None,
            last_edited: None,
        };
        self.created
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use crate::remote::MemoryStore;

    #[test]
    fn test_creates_stay_local() {
        let backing = MemoryStore::new();
        backing.seed("db", "existing");
        let names = PropertyNames::default();
        let store = DryRunStore::new(&backing, &names);

        let mut props = PageProperties::new();
        props.insert(names.identity.clone(), PropertyValue::RichText("new".into()));
        store.create("db", &props).unwrap();

        assert_eq!(backing.len("db"), 1);
        assert_eq!(backing.create_calls(), 0);
        assert_eq!(store.would_create(), 1);

        let filter = QueryFilter::identity(&names.identity, "new");
        let page = store.query("db", Some(&filter), None).unwrap();
        assert_eq!(page.entries.len(), 1);
        assert!(page.entries[0].id.starts_with("dry-run-"));
    }
}
