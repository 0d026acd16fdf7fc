use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::DictionaryStore;
use crate::Result;

/// Background task that calls [`DictionaryStore::reload`] every `period`.
///
/// Owned by exactly one store's filter; nothing is shared process-wide.
/// Reloads run one at a time: a tick that falls due while a reload is still
/// running is skipped, not queued.
#[derive(Debug)]
pub struct RefreshScheduler {
    store: Arc<DictionaryStore>,
    period: Duration,
    shutdown_tx: watch::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Spawns the refresh loop on the current tokio runtime.
    /// The first reload happens one full `period` after start.
    pub fn start(
        store: Arc<DictionaryStore>,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = tokio::spawn(Self::run(store.clone(), period, shutdown_rx));
        info!(?period, location = ?store.location(), "dictionary refresh scheduler started");

        Self {
            store,
            period,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    async fn run(
        store: Arc<DictionaryStore>,
        period: Duration,
        mut shutdown_rx: watch::Receiver<()>,
    ) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    debug!("[RefreshScheduler] shutdown signal received.");
                    break;
                }

                _ = ticker.tick() => {
                    // File I/O and pattern compilation block; keep them off the
                    // async workers. Awaiting here is what prevents overlap.
                    let store = store.clone();
                    if let Err(e) = tokio::task::spawn_blocking(move || store.reload()).await {
                        error!("dictionary reload task failed: {:?}", e);
                    }
                }
            }
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the loop and waits for an in-flight reload to finish.
    ///
    /// Idempotent. Once this returns no further reloads happen and the
    /// store is [`StoreState::Stopped`](crate::StoreState::Stopped).
    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        // Receiver only disappears if the task already ended
        let _ = self.shutdown_tx.send(());
        let joined = handle.await;
        self.store.mark_stopped();
        info!(location = ?self.store.location(), "dictionary refresh scheduler stopped");

        joined?;
        Ok(())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("RefreshScheduler dropped without stop(); signalling shutdown without waiting");
            let _ = self.shutdown_tx.send(());
        }
    }
}
