//! Translate Error Hierarchy
//!
//! Errors are grouped by the layer that raises them: configuration,
//! dictionary loading/matching, and per-record field updates.
//!
//! Only [`Error::is_fatal`] errors may escape per-record processing; every
//! other error raised while translating a single record is logged at the
//! filter boundary and the record continues down the pipeline.

use std::path::PathBuf;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dictionary source, parse and pattern failures
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// Record access and fallback rendering failures
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Background refresh task could not be joined
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    /// Unrecoverable failures requiring the pipeline to stop
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Error {
    /// Resource exhaustion or environment failures.
    ///
    /// These are never swallowed by the per-record error boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_) | Error::TaskFailed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// Source file does not exist (always retryable)
    #[error("Dictionary file not found: {path}")]
    Missing { path: PathBuf },

    /// Disk I/O failure while reading the source
    #[error("Failed to read dictionary file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is larger than the configured `max_bytes`
    #[error("Dictionary file {path} is {size} bytes, exceeding the limit of {limit} bytes")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Malformed content for the detected format
    #[error("Bad syntax in {format} dictionary file {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// A dictionary key could not be compiled as a regular expression
    #[error("Invalid dictionary pattern {key:?}")]
    InvalidPattern {
        key: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// File extension is not one of yml/yaml/json/csv
    #[error("Dictionary {0} has a non valid format")]
    UnsupportedFormat(PathBuf),

    /// First load failed; raised from `DictionaryStore::load(true)` only
    #[error("{source} when loading dictionary file at {location}")]
    LoadFailed {
        location: String,
        #[source]
        source: Box<DictionaryError>,
    },
}

impl DictionaryError {
    pub fn is_missing(&self) -> bool {
        matches!(self, DictionaryError::Missing { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Malformed field reference such as `[a` or `a]b`
    #[error("Invalid field reference: {0}")]
    InvalidReference(String),

    /// An intermediate value on the path is neither an object nor an array
    #[error("Cannot set {field}: segment {segment:?} is not a container")]
    PathConflict { field: String, segment: String },

    /// Rendered fallback could not be deserialized into the configured format
    #[error("Fallback could not be parsed as {format}: {message}")]
    Fallback {
        format: &'static str,
        message: String,
    },
}
