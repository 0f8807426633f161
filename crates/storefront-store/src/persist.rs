//! # Persist Worker
//!
//! Writes shop snapshots to the slot in the background so that mutations
//! never wait on storage.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Persist Worker Flow                             │
//! │                                                                         │
//! │  ShopStore::dispatch                                                   │
//! │       │ schedule(snapshot)      (non-blocking, unbounded queue)        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  mpsc queue:  Write(s1)  Write(s2)  Flush  Write(s3)  ...       │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PersistWorker::run                                             │   │
//! │  │                                                                 │   │
//! │  │  1. Wait for the next command                                  │   │
//! │  │  2. Drain everything already queued                            │   │
//! │  │  3. Keep only the newest snapshot (older ones are superseded)  │   │
//! │  │  4. serde_json::to_string → KvStore::set                       │   │
//! │  │  5. Record success/failure in PersistStatus                    │   │
//! │  │  6. Release flush waiters                                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Commands are handled in send order, so the slot converges on the      │
//! │  most recent state. A failed write is logged and dropped; the next     │
//! │  mutation writes the full state again.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use storefront_core::ShopState;

use crate::error::{StoreError, StoreResult};
use crate::kv::KvStore;

// =============================================================================
// Status
// =============================================================================

/// Counters describing the worker's history. Diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistStatus {
    /// Snapshots successfully written.
    pub writes_ok: u64,

    /// Snapshots whose write failed.
    pub writes_failed: u64,

    /// Snapshots skipped because a newer one was already queued.
    pub coalesced: u64,

    pub last_error: Option<String>,

    pub last_success_at: Option<DateTime<Utc>>,
}

fn lock_status(status: &Mutex<PersistStatus>) -> std::sync::MutexGuard<'_, PersistStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Commands
// =============================================================================

enum PersistCommand {
    Write(ShopState),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// One drained run of the queue.
#[derive(Default)]
struct Batch {
    latest: Option<ShopState>,
    superseded: u64,
    waiters: Vec<oneshot::Sender<()>>,
    stop: bool,
}

impl Batch {
    fn push(&mut self, command: PersistCommand) {
        match command {
            PersistCommand::Write(snapshot) => {
                if self.latest.replace(snapshot).is_some() {
                    self.superseded += 1;
                }
            }
            PersistCommand::Flush(waiter) => self.waiters.push(waiter),
            PersistCommand::Shutdown(waiter) => {
                self.waiters.push(waiter);
                self.stop = true;
            }
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Sending side of the worker. Cheap to clone.
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
    status: Arc<Mutex<PersistStatus>>,
}

impl PersistHandle {
    /// Queues `snapshot` for writing. Never blocks and never fails; if the
    /// worker is gone the snapshot is dropped with a warning.
    pub fn schedule(&self, snapshot: ShopState) {
        if self.tx.send(PersistCommand::Write(snapshot)).is_err() {
            warn!("Persist worker has stopped; snapshot not saved");
        }
    }

    /// Waits until every snapshot scheduled before this call has been
    /// written (or has failed).
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistCommand::Flush(ack_tx))
            .map_err(|_| StoreError::WorkerStopped)?;
        ack_rx.await.map_err(|_| StoreError::WorkerStopped)
    }

    /// Writes anything still queued, then stops the worker.
    pub async fn shutdown(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistCommand::Shutdown(ack_tx))
            .map_err(|_| StoreError::WorkerStopped)?;
        ack_rx.await.map_err(|_| StoreError::WorkerStopped)
    }

    pub fn status(&self) -> PersistStatus {
        lock_status(&self.status).clone()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background task owning the receiving side of the queue.
pub struct PersistWorker {
    kv: Arc<dyn KvStore>,
    key: String,
    rx: mpsc::UnboundedReceiver<PersistCommand>,
    status: Arc<Mutex<PersistStatus>>,
}

impl PersistWorker {
    /// Creates a worker writing to `key` in `kv`, and its handle.
    pub fn new(kv: Arc<dyn KvStore>, key: impl Into<String>) -> (Self, PersistHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(PersistStatus::default()));

        let worker = PersistWorker {
            kv,
            key: key.into(),
            rx,
            status: Arc::clone(&status),
        };

        (worker, PersistHandle { tx, status })
    }

    /// Creates a worker and spawns it on the current tokio runtime.
    pub fn spawn(kv: Arc<dyn KvStore>, key: impl Into<String>) -> PersistHandle {
        let (worker, handle) = PersistWorker::new(kv, key);
        tokio::spawn(worker.run());
        handle
    }

    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(key = %self.key, "Persist worker starting");

        while let Some(first) = self.rx.recv().await {
            let mut batch = Batch::default();
            batch.push(first);
            while let Ok(next) = self.rx.try_recv() {
                batch.push(next);
            }

            if batch.superseded > 0 {
                debug!(skipped = batch.superseded, "Coalesced queued snapshots");
                lock_status(&self.status).coalesced += batch.superseded;
            }

            if let Some(snapshot) = batch.latest.take() {
                self.write(&snapshot).await;
            }

            for waiter in batch.waiters.drain(..) {
                let _ = waiter.send(());
            }

            if batch.stop {
                info!("Persist worker shutting down");
                break;
            }
        }

        info!("Persist worker stopped");
    }

    async fn write(&self, snapshot: &ShopState) {
        let result = match serde_json::to_string(snapshot) {
            Ok(json) => self.kv.set(&self.key, &json).await,
            Err(e) => Err(StoreError::Encode(e.to_string())),
        };

        let mut status = lock_status(&self.status);
        match result {
            Ok(()) => {
                status.writes_ok += 1;
                status.last_success_at = Some(Utc::now());
                debug!(
                    key = %self.key,
                    cart_lines = snapshot.cart_items.len(),
                    wishlist = snapshot.wishlist_items.len(),
                    "Persisted shop state"
                );
            }
            Err(e) => {
                status.writes_failed += 1;
                status.last_error = Some(e.to_string());
                error!(key = %self.key, error = %e, "Failed to persist shop state");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use async_trait::async_trait;
    use storefront_core::{reduce, Money, Product, ShopIntent};

    /// Rejects every write.
    struct BrokenKvStore;

    #[async_trait]
    impl KvStore for BrokenKvStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::write(key, "quota exceeded"))
        }
    }

    fn state_with(ids: &[i64]) -> ShopState {
        ids.iter().fold(ShopState::new(), |state, id| {
            reduce(
                &state,
                ShopIntent::AddToCart(Product::new(*id, format!("Item {}", id), Money::from_cents(100))),
            )
        })
    }

    #[tokio::test]
    async fn test_flush_waits_for_scheduled_write() {
        let kv = Arc::new(MemoryKvStore::new());
        let handle = PersistWorker::spawn(kv.clone(), "shopData");

        handle.schedule(state_with(&[1]));
        handle.flush().await.unwrap();

        let saved: ShopState = serde_json::from_str(&kv.peek("shopData").unwrap()).unwrap();
        assert_eq!(saved, state_with(&[1]));
        assert_eq!(handle.status().writes_ok, 1);
    }

    #[tokio::test]
    async fn test_queued_snapshots_coalesce_to_newest() {
        let kv = Arc::new(MemoryKvStore::new());
        let (worker, handle) = PersistWorker::new(kv.clone(), "shopData");

        // Queue before the worker runs so all three land in one batch
        handle.schedule(state_with(&[1]));
        handle.schedule(state_with(&[1, 2]));
        handle.schedule(state_with(&[1, 2, 3]));
        tokio::spawn(worker.run());
        handle.flush().await.unwrap();

        let saved: ShopState = serde_json::from_str(&kv.peek("shopData").unwrap()).unwrap();
        assert_eq!(saved, state_with(&[1, 2, 3]));

        let status = handle.status();
        assert_eq!(status.writes_ok, 1);
        assert_eq!(status.coalesced, 2);
    }

    #[tokio::test]
    async fn test_failed_write_is_recorded_not_raised() {
        let handle = PersistWorker::spawn(Arc::new(BrokenKvStore), "shopData");

        handle.schedule(state_with(&[1]));
        handle.flush().await.unwrap();

        let status = handle.status();
        assert_eq!(status.writes_ok, 0);
        assert_eq!(status.writes_failed, 1);
        assert!(status.last_error.unwrap().contains("quota exceeded"));
        assert!(status.last_success_at.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_stops() {
        let kv = Arc::new(MemoryKvStore::new());
        let handle = PersistWorker::spawn(kv.clone(), "shopData");

        handle.schedule(state_with(&[7]));
        handle.shutdown().await.unwrap();

        assert!(kv.peek("shopData").is_some());
        assert!(matches!(handle.flush().await, Err(StoreError::WorkerStopped)));

        // Scheduling after shutdown is a logged no-op
        handle.schedule(state_with(&[8]));
        assert!(!handle.is_running());
    }
}
