// crates/wordlink-store/src/prefetch.rs
//
// Background shard prefetcher.
//
// On a fixed tick, loads the lowest-indexed shard that has not been resolved
// yet, so that later lookups rarely wait on the network. Shares the chunk
// store's single-flight cells with foreground lookups, so a shard is never
// fetched twice. Stops on request or once every shard is resolved.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::EmbeddingCache;

/// Spawns the background prefetch task.
pub struct Prefetcher;

/// Handle to a running prefetcher. Dropping it also stops the task.
pub struct PrefetchHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<usize>,
}

impl Prefetcher {
    /// Start prefetching into `cache`, one shard per `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(cache: Arc<EmbeddingCache>, interval: Duration) -> PrefetchHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_prefetch(cache, interval, stop_rx));
        PrefetchHandle { stop_tx, task }
    }
}

impl PrefetchHandle {
    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the task to stop and wait for it.
    ///
    /// Returns the number of shards the prefetcher itself loaded.
    pub async fn stop(self) -> usize {
        let _ = self.stop_tx.send(true);
        match self.task.await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Prefetch task ended abnormally: {}", e);
                0
            }
        }
    }

    /// Wait for the task to finish on its own (all shards resolved).
    pub async fn join(self) -> usize {
        let PrefetchHandle { stop_tx, task } = self;
        let loaded = task.await.unwrap_or(0);
        drop(stop_tx);
        loaded
    }
}

async fn run_prefetch(
    cache: Arc<EmbeddingCache>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) -> usize {
    let Some(store) = cache.chunk_store().cloned() else {
        tracing::debug!("Prefetcher: per-word layout, nothing to prefetch");
        return 0;
    };

    tracing::info!(
        "Prefetcher started (interval={}ms, max_shards={})",
        interval.as_millis(),
        store.max_shards()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut loaded = 0usize;

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                // A closed channel means the handle was dropped.
                if changed.is_err() || *stop_rx.borrow() {
                    tracing::info!("Prefetcher received stop signal");
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = cache.ensure_loaded().await {
                    tracing::warn!("Prefetcher: lexicon not ready: {}", e);
                    continue;
                }

                let Some(index) = store.next_unresolved() else {
                    tracing::info!(
                        "Prefetcher finished: {} shards in memory",
                        store.loaded_count()
                    );
                    break;
                };

                match store.load_shard(index).await {
                    Ok(Some(_)) => {
                        loaded += 1;
                        tracing::trace!("Prefetcher: loaded shard {}", index);
                    }
                    Ok(None) => tracing::debug!("Prefetcher: shard {} is absent", index),
                    Err(e) => tracing::warn!("Prefetcher: failed to load shard {}: {}", index, e),
                }
            }
        }
    }

    loaded
}
