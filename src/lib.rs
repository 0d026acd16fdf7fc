//! # d-translate
//!
//! Translates values found in a stream of records by looking them up in a
//! dictionary and writing the result back into the record.
//!
//! ## Components
//!
//! - [`DictionaryStore`] - the authoritative key/value mapping plus the active
//!   [`MatchStrategy`], guarded by a single reader/writer lock
//! - [`MatchStrategy`] - `Exact`, `ExactRegex` or `RegexUnion` matching
//! - [`RefreshScheduler`] - background task that periodically reloads a
//!   file-backed store
//! - [`FieldUpdater`] - scalar, array-of-values and array-of-objects record
//!   updates with fallback support
//! - [`TranslateFilter`] - wires the above together from a [`TranslateConfig`]
//!
//! ```text
//! RefreshScheduler ──tick──▶ DictionaryStore::reload ──▶ DictionarySource::read
//!                                   │ (write lock)             │
//!                                   ▼                          ▼
//!                           MatchStrategy::rebuild ◀──── ordered pairs
//!
//! Record ──▶ FieldUpdater ──▶ DictionaryStore::fetch (read lock) ──▶ Record
//! ```

mod config;
mod constants;
mod dictionary;
mod errors;
mod filter;
mod record;
mod update;
pub mod utils;

pub use self::config::*;
pub use dictionary::*;
pub use errors::*;
pub use filter::*;
pub use record::*;
pub use update::*;
