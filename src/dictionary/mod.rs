//! Concurrent, self-refreshing dictionary lookup engine.
//!
//! # Architecture
//!
//! ```text
//! RefreshScheduler (one tokio task per store)
//!     │ tick (missed ticks skipped, never queued)
//!     ▼
//! DictionaryStore::reload ── short interval? ── mtime unchanged ──▶ skip
//!     │
//!     ▼  write lock held for the whole sequence
//! DictionarySource::read ─▶ merge/replace into staged mapping ─▶ MatchStrategy::rebuild ─▶ commit
//!
//! Workers ─▶ DictionaryStore::fetch ─▶ read lock ─▶ MatchStrategy::fetch ─▶ owned copy
//! ```
//!
//! A failed reload never commits: readers keep seeing the previous mapping
//! and strategy until a later reload succeeds.

mod scheduler;
mod source;
mod store;
mod strategy;
pub use scheduler::*;
pub use source::*;
pub use store::*;
pub use strategy::*;


use std::time::SystemTime;

use indexmap::IndexMap;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::DictionaryError;

/// Insertion-ordered mapping. Order decides which key wins in
/// `ExactRegex` and `RegexUnion` modes.
pub type Dictionary = IndexMap<String, Value>;

/// Where a file-backed dictionary comes from.
///
/// Implementations parse the whole source on every `read`; the store
/// decides whether and how the result is applied.
#[cfg_attr(test, automock)]
pub trait DictionarySource: Send + Sync {
    /// Ordered key/value pairs, keys already coerced to strings
    fn read(&self) -> Result<Vec<(String, Value)>, DictionaryError>;

    /// Last modification time. A source that does not exist must fail with
    /// [`DictionaryError::Missing`].
    fn modified(&self) -> Result<SystemTime, DictionaryError>;

    /// Human readable identifier for logs and errors
    fn location(&self) -> String;
}
