// -
// Refresh

/// Refresh intervals at or below this many seconds only reload when the
/// source modification time has changed.
pub(crate) const SHORT_REFRESH_THRESHOLD_SECS: i64 = 300;

pub(crate) const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 300;

// -
// Dictionary files

/// 128 MiB
pub(crate) const DEFAULT_DICTIONARY_MAX_BYTES: u64 = 134_217_728;

pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Compiled size limit for the single alternation built in substring mode.
/// The regex crate default (10 MiB) is too small for dictionaries with
/// tens of thousands of keys.
pub(crate) const UNION_PATTERN_SIZE_LIMIT: usize = 512 * 1024 * 1024;

// -
// Field references

pub(crate) const DEFAULT_TARGET_SUFFIX: &str = "_translation";

// -
// Configuration

pub(crate) const CONFIG_ENV_PREFIX: &str = "TRANSLATE";
pub(crate) const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
