//! Remote page store.
//!
//! The sync core talks to the recipe database only through [`RemoteStore`]:
//! a paginated, filterable listing and a page create call. Implementations:
//!
//! - [`NotionStore`] - the Notion REST API over blocking `reqwest`
//! - [`MemoryStore`] - in-process store with pagination and fault injection
//! - [`DryRunStore`] - reads from another store, never writes to it

mod dry_run;
mod memory;
mod notion;

pub use dry_run::DryRunStore;
pub use memory::MemoryStore;
pub use notion::{NotionStore, NOTION_API_URL, NOTION_VERSION};

use serde::{Deserialize, Serialize};

use crate::model::PageProperties;

/// An existing page of the remote database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Opaque page id.
    pub id: String,
    /// Value of the identity column, if the page has one.
    pub identity_key: Option<String>,
    /// Browser URL of the page.
    pub url: Option<String>,
    /// ISO8601 last edit time reported by the store.
    pub last_edited: Option<String>,
}

/// Exact-match predicate on the identity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    /// Column name.
    pub property: String,
    /// Value the column must equal.
    pub equals: String,
}

impl QueryFilter {
    #[must_use]
    pub fn identity(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            equals: value.into(),
        }
    }

    /// Whether the entry's identity value equals the filter value exactly.
    #[must_use]
    pub fn matches(&self, entry: &RemoteEntry) -> bool {
        entry.identity_key.as_deref() == Some(self.equals.as_str())
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub entries: Vec<RemoteEntry>,
    /// Cursor for the next page.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Failure categories of remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Connection, DNS, TLS or timeout failure.
    Network,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    Server,
    /// HTTP 4xx other than 429.
    Client,
    /// Response body could not be understood.
    Decode,
}

impl ErrorCategory {
    /// Every category.
    pub const ALL: [Self; 5] = [
        Self::Network,
        Self::RateLimited,
        Self::Server,
        Self::Client,
        Self::Decode,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Client => "client",
            Self::Decode => "decode",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "rate_limited" | "ratelimited" | "429" => Ok(Self::RateLimited),
            "server" | "5xx" => Ok(Self::Server),
            "client" | "4xx" => Ok(Self::Client),
            "decode" => Ok(Self::Decode),
            _ => Err(format!("Unknown error category: {s}")),
        }
    }
}

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited{}", .retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected {status} ({code}): {message}")]
    Client {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Client { .. } => ErrorCategory::Client,
            Self::Decode(_) => ErrorCategory::Decode,
        }
    }
}

/// Result type for remote calls.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// The page store the sync core reads from and creates pages in.
///
/// Calls block until the store answers. The core never deletes or edits
/// pages through this trait.
pub trait RemoteStore {
    /// Fetch one page of the database listing, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the request fails.
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage>;

    /// Create a page with the given properties.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the request fails.
    fn create(&self, database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage> {
        (**self).query(database_id, filter, cursor)
    }

    fn create(&self, database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry> {
        (**self).create(database_id, properties)
    }
}

impl<S: RemoteStore + ?Sized> RemoteStore for Box<S> {
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage> {
        (**self).query(database_id, filter, cursor)
    }

    fn create(&self, database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry> {
        (**self).create(database_id, properties)
    }
}
