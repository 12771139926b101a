//! Background sweep evicting expired grants from the token cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::TokenCache;

/// Periodic task dropping token-expired and freshness-expired cache entries.
///
/// Eviction on the lookup path already keeps answers correct; the sweep only
/// reclaims memory held by tokens nobody presents anymore.
pub struct SweepTask {
    /// Cache being swept.
    cache: Arc<TokenCache>,
    /// Time between sweeps.
    interval: Duration,
    /// Whether the sweep loop is running.
    running: AtomicBool,
    /// Shutdown signal sender.
    shutdown_tx: RwLock<Option<mpsc::Sender<()>>>,
    /// Sweep loop handle.
    loop_handle: RwLock<Option<JoinHandle<()>>>,
}

impl SweepTask {
    /// Creates a sweep task over the given cache.
    #[must_use]
    pub fn new(cache: Arc<TokenCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            running: AtomicBool::new(false),
            shutdown_tx: RwLock::new(None),
            loop_handle: RwLock::new(None),
        }
    }

    /// Check if the sweep loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts the sweep loop. Starting an already-running task is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("sweep task already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        *self.shutdown_tx.write() = Some(shutdown_tx);

        let cache = self.cache.clone();
        let sweep_interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = cache.sweep(Utc::now());
                        if removed > 0 {
                            debug!(removed, "swept expired grants from token cache");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("sweep task received shutdown signal");
                        break;
                    }
                }
            }
        });

        *self.loop_handle.write() = Some(handle);
        info!(interval_secs = self.interval.as_secs(), "token cache sweep started");
    }

    /// Stops the sweep loop and waits for it to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        // Send shutdown signal
        if let Some(tx) = self.shutdown_tx.write().take() {
            let _ = tx.send(()).await;
        }

        // Wait for loop to finish
        if let Some(handle) = self.loop_handle.write().take() {
            let _ = handle.await;
        }

        info!("token cache sweep stopped");
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        if self.running.load(Ordering::Acquire) {
            if let Some(tx) = self.shutdown_tx.write().take() {
                // Try to send, ignore if receiver dropped
                let _ = tx.try_send(());
            }
        }
    }
}
