//! Recipe sync core.
//!
//! Moves Paprika recipes into a Notion database without ever writing the
//! same recipe twice:
//!
//! - **Fingerprint**: SHA256 over the canonical recipe JSON, the identity key
//! - **Transform**: Paprika recipe → Notion page fields
//! - **Pager**: lazy listing of the remote database, page by page
//! - **Upsert**: lookup by identity key, then create or skip
//! - **Batch**: transform and upsert over many recipes with a summary report
//!
//! # Architecture
//!
//! Each recipe flows `BatchRunner` → `transform` → `UpsertCoordinator` →
//! `RemoteQueryPager` → [`RemoteStore`](crate::remote::RemoteStore). Remote
//! calls go through one injected [`RetryPolicy`]; progress goes to one
//! injected [`SyncReporter`].
//!
//! # Example
//!
//! ```ignore
//! use p2n::remote::MemoryStore;
//! use p2n::sync::{BatchRunner, UpsertCoordinator};
//!
//! let store = MemoryStore::new();
//! let runner = BatchRunner::new(UpsertCoordinator::new(&store, "recipes"));
//! let report = runner.run(records)?;
//! println!("{} created, {} skipped", report.created, report.skipped);
//! ```

mod batch;
mod file;
mod hash;
mod pager;
mod report;
mod retry;
mod transform;
mod types;
mod upsert;

pub use batch::BatchRunner;
pub use file::{atomic_write, read_failures, write_failures};
pub use hash::{canonical_json, content_hash, fingerprint, has_changed, verify, with_recomputed_hash};
pub use pager::{QueryPager, RemoteQueryPager};
pub use report::{CollectingReporter, SilentReporter, SyncEvent, SyncReporter, TracingReporter};
pub use retry::{RetryExhausted, RetryPolicy, DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use transform::{bullet_list, transform, INGREDIENT_BULLET};
pub use types::{
    BatchReport, FailedRecord, Outcome, SyncError, SyncResult, TransformError,
};
pub use upsert::UpsertCoordinator;
