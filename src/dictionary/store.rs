use std::fmt;
use std::time::SystemTime;

use parking_lot::Mutex;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::Dictionary;
use super::DictionarySource;
use super::MatchStrategy;
use crate::constants::SHORT_REFRESH_THRESHOLD_SECS;
use crate::utils::scoped_timer::ScopedTimer;
use crate::DictionaryError;
use crate::MatchMode;
use crate::RefreshBehaviour;

/// Lifecycle of a store
///
/// `Uninitialized -> Loaded -> Stopped`. A failed reload keeps the store
/// `Loaded` with its previous mapping; there is no corrupted state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loaded,
    /// Scheduler shut down; lookups still served from the last mapping
    Stopped,
}

/// Modification tracking used by `reload`
#[derive(Clone, Copy, Debug)]
pub struct RefreshState {
    pub last_modified: Option<SystemTime>,
    pub interval_secs: i64,
    /// Reload only when the source mtime changed
    pub short: bool,
}

impl RefreshState {
    pub fn new(interval_secs: i64) -> Self {
        Self {
            last_modified: None,
            interval_secs,
            short: interval_secs <= SHORT_REFRESH_THRESHOLD_SECS,
        }
    }
}

/// Everything readers must observe atomically
struct Snapshot {
    dictionary: Dictionary,
    strategy: MatchStrategy,
}

/// Single authoritative holder of the mapping and its match strategy.
///
/// # Locking
///
/// - `fetch` takes the read lock for the strategy lookup and the copy of the
///   result only; fetches never block each other.
/// - `load` takes the write lock for the whole "read source, merge or
///   replace, rebuild strategy" sequence, so readers never see a half-applied
///   reload. The new snapshot is staged and committed only on success.
pub struct DictionaryStore {
    snapshot: RwLock<Snapshot>,
    source: Option<Box<dyn DictionarySource>>,
    update_mode: RefreshBehaviour,
    refresh: Mutex<RefreshState>,
    state: Mutex<StoreState>,
}

impl fmt::Debug for DictionaryStore {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DictionaryStore")
            .field("source", &self.location())
            .field("update_mode", &self.update_mode)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DictionaryStore {
    /// Store over a fixed in-memory mapping; `reload` is a no-op.
    ///
    /// Fails when a key is not a valid pattern in `ExactRegex` mode.
    pub fn from_entries(
        entries: Dictionary,
        mode: MatchMode,
    ) -> Result<Self, DictionaryError> {
        let strategy = MatchStrategy::build(mode, &entries)?;
        debug!(entries = entries.len(), ?mode, "in-memory dictionary ready");
        Ok(Self {
            snapshot: RwLock::new(Snapshot {
                dictionary: entries,
                strategy,
            }),
            source: None,
            update_mode: RefreshBehaviour::Merge,
            refresh: Mutex::new(RefreshState::new(0)),
            state: Mutex::new(StoreState::Loaded),
        })
    }

    /// Empty store over `source`. Call [`load`](Self::load) with
    /// `raise_on_error = true` before sharing it.
    pub fn from_source(
        source: Box<dyn DictionarySource>,
        mode: MatchMode,
        refresh_interval_secs: i64,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot {
                dictionary: Dictionary::new(),
                strategy: MatchStrategy::empty(mode),
            }),
            source: Some(source),
            update_mode: RefreshBehaviour::Merge,
            refresh: Mutex::new(RefreshState::new(refresh_interval_secs)),
            state: Mutex::new(StoreState::Uninitialized),
        }
    }

    /// Pure configuration; takes effect on the next load.
    pub fn set_update_mode(
        &mut self,
        mode: RefreshBehaviour,
    ) {
        self.update_mode = mode;
    }

    pub fn update_mode(&self) -> RefreshBehaviour {
        self.update_mode
    }

    /// Reads the source and applies it.
    ///
    /// A missing source is only logged, even on the first load. Any other
    /// failure is returned as [`DictionaryError::LoadFailed`] when
    /// `raise_on_error` is set, otherwise logged; in both cases the previous
    /// mapping and strategy stay in effect.
    pub fn load(
        &self,
        raise_on_error: bool,
    ) -> Result<(), DictionaryError> {
        let Some(source) = &self.source else {
            return Ok(());
        };

        let result = self.load_from(source.as_ref());
        self.mark_loaded();

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_missing() => {
                warn!(path = %source.location(), "dictionary file read failure, continuing with old dictionary");
                Ok(())
            }
            Err(e) if raise_on_error => Err(DictionaryError::LoadFailed {
                location: source.location(),
                source: Box::new(e),
            }),
            Err(e) => {
                warn!(
                    path = %source.location(),
                    error = %e,
                    "dictionary reload failed, continuing with old dictionary"
                );
                Ok(())
            }
        }
    }

    fn load_from(
        &self,
        source: &dyn DictionarySource,
    ) -> Result<(), DictionaryError> {
        let modified = source.modified()?;
        self.refresh.lock().last_modified = Some(modified);

        let _timer = ScopedTimer::new("dictionary_load", source.location());
        let mut snapshot = self.snapshot.write();

        let pairs = source.read()?;
        let mut staged = match self.update_mode {
            RefreshBehaviour::Merge => snapshot.dictionary.clone(),
            RefreshBehaviour::Replace => Dictionary::with_capacity(pairs.len()),
        };
        staged.extend(pairs);
        let strategy = MatchStrategy::build(snapshot.strategy.mode(), &staged)?;

        info!(
            path = %source.location(),
            entries = staged.len(),
            mode = ?self.update_mode,
            "dictionary loaded"
        );
        *snapshot = Snapshot {
            dictionary: staged,
            strategy,
        };
        Ok(())
    }

    /// Scheduler entry point. With a short refresh interval the source is
    /// only re-read when its modification time differs from the last load.
    pub fn reload(&self) {
        let Some(source) = &self.source else {
            return;
        };
        if self.state() == StoreState::Stopped {
            debug!(path = %source.location(), "store stopped, reload ignored");
            return;
        }

        let refresh = *self.refresh.lock();
        if refresh.short {
            if let Ok(modified) = source.modified() {
                if refresh.last_modified == Some(modified) {
                    trace!(path = %source.location(), "dictionary unchanged, skipping reload");
                    return;
                }
            }
        }

        // Errors are logged inside; the previous mapping stays in effect
        let _ = self.load(false);
    }

    /// Looks `source` up with the active strategy.
    ///
    /// The returned value is a deep copy; mutating it never affects the
    /// stored dictionary or other callers.
    pub fn fetch(
        &self,
        source: &str,
    ) -> Option<Value> {
        let snapshot = self.snapshot.read();
        snapshot.strategy.fetch(&snapshot.dictionary, source)
    }

    /// Copy of the current mapping
    pub fn dictionary(&self) -> Dictionary {
        self.snapshot.read().dictionary.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> MatchMode {
        self.snapshot.read().strategy.mode()
    }

    pub fn state(&self) -> StoreState {
        *self.state.lock()
    }

    pub fn refresh_state(&self) -> RefreshState {
        *self.refresh.lock()
    }

    pub fn is_file_backed(&self) -> bool {
        self.source.is_some()
    }

    pub fn location(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.location())
    }

    fn mark_loaded(&self) {
        let mut state = self.state.lock();
        if *state == StoreState::Uninitialized {
            *state = StoreState::Loaded;
        }
    }

    pub(crate) fn mark_stopped(&self) {
        *self.state.lock() = StoreState::Stopped;
    }
}
