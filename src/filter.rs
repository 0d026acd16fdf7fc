//! Wiring of one translation rule: store, updater and optional scheduler.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::error;
use tracing::info;

use crate::DictionaryStore;
use crate::FieldUpdater;
use crate::FileSource;
use crate::Record;
use crate::RefreshScheduler;
use crate::Result;
use crate::TranslateConfig;
use crate::UpdateSpec;

/// A registered translation rule
///
/// # Usage
/// ```ignore
/// let mut filter = TranslateFilter::register(TranslateConfig::new()?).await?;
/// let matched = filter.filter(&mut event)?;
/// filter.close().await?;
/// ```
#[derive(Debug)]
pub struct TranslateFilter {
    updater: FieldUpdater,
    store: Arc<DictionaryStore>,
    scheduler: Option<RefreshScheduler>,
}

impl TranslateFilter {
    /// Validates `config`, performs the first dictionary load and starts the
    /// refresh scheduler for file dictionaries with a positive interval.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - Invalid configuration
    /// - First load failure other than a missing file
    /// - Invalid regex key in `ExactRegex` mode
    pub async fn register(config: TranslateConfig) -> Result<Self> {
        let config = config.validate()?;
        let mode = config.matching.mode();
        let dictionary = &config.dictionary;

        let store = match &dictionary.path {
            Some(path) => {
                let source = FileSource::new(path, dictionary.max_bytes)?;
                let mut store = DictionaryStore::from_source(Box::new(source), mode, dictionary.refresh_interval);
                store.set_update_mode(dictionary.refresh_behaviour);

                let store = Arc::new(store);
                let loader = store.clone();
                tokio::task::spawn_blocking(move || loader.load(true)).await??;
                store
            }
            None => Arc::new(DictionaryStore::from_entries(dictionary.entries.clone(), mode)?),
        };

        let scheduler = if dictionary.refresh_enabled() {
            let period = Duration::from_secs(dictionary.refresh_interval.unsigned_abs());
            Some(RefreshScheduler::start(store.clone(), period))
        } else {
            debug!("dictionary refresh disabled");
            None
        };

        let updater = FieldUpdater::new(UpdateSpec::from_config(&config.field, store.clone())?);
        info!(
            source = %updater.spec().source,
            target = %updater.spec().target,
            ?mode,
            entries = store.len(),
            "translate filter registered"
        );

        Ok(Self {
            updater,
            store,
            scheduler,
        })
    }

    /// Translates one record.
    ///
    /// Returns `true` when a destination value was written. Errors other
    /// than [`Error::is_fatal`](crate::Error::is_fatal) ones are logged and
    /// reported as `Ok(false)` with the record left as it was.
    pub fn filter(
        &self,
        record: &mut dyn Record,
    ) -> Result<bool> {
        if !self.updater.test_for_inclusion(&*record) {
            return Ok(false);
        }

        match self.updater.update(record) {
            Ok(matched) => Ok(matched),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                error!(
                    field = %self.updater.spec().source,
                    error = %e,
                    "Something went wrong when attempting to translate from dictionary"
                );
                Ok(false)
            }
        }
    }

    pub fn store(&self) -> &Arc<DictionaryStore> {
        &self.store
    }

    pub fn updater(&self) -> &FieldUpdater {
        &self.updater
    }

    pub fn scheduler(&self) -> Option<&RefreshScheduler> {
        self.scheduler.as_ref()
    }

    /// Stops the scheduler, waiting for an in-flight reload. Idempotent.
    /// The store stays queryable afterwards.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.stop().await?;
        }
        self.store.mark_stopped();
        Ok(())
    }
}
