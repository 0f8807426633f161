//! # ShopStore
//!
//! The runtime handle the screens hold: current state behind a lock, every
//! mutation routed through the pure reducer, every new state handed to the
//! persist worker.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ShopStore Lifecycle                            │
//! │                                                                         │
//! │   ShopStore::new ──► Uninitialized ──hydrate()──► Ready                 │
//! │                          │                                              │
//! │                          │ mutations are accepted and applied to the    │
//! │                          │ empty state; each one is counted             │
//! │                          ▼                                              │
//! │                  hydrate() reads the slot once:                         │
//! │                    missing        → keep current state                  │
//! │                    unreadable     → warn, keep current state            │
//! │                    parsed record  → HydrationPolicy decides:            │
//! │                       PersistedWins: Load(record), warn about the       │
//! │                                      counted mutations it replaced      │
//! │                       LocalWins:     keep local state if any mutation   │
//! │                                      happened, else Load(record)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Transitions run under one mutex and never suspend while holding it. The
//! snapshot is queued for persistence before the lock is released, so the
//! worker sees snapshots in transition order.
//!
//! Nothing is queued while `Uninitialized`: the slot still holds the previous
//! session's record and hydration has to read it first. Whatever state
//! hydration settles on is queued once the store is `Ready`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use storefront_core::shop::apply;
use storefront_core::{
    CoreError, CoreResult, Product, ProductId, ShopIntent, ShopState, DEFAULT_STATE_KEY,
};

use crate::error::StoreError;
use crate::kv::KvStore;
use crate::persist::{PersistHandle, PersistStatus, PersistWorker};

// =============================================================================
// Configuration
// =============================================================================

/// What hydration does with mutations that happened before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationPolicy {
    /// The persisted record replaces the in-memory state unconditionally.
    #[default]
    PersistedWins,

    /// The persisted record is only applied if nothing was mutated yet.
    LocalWins,
}

impl fmt::Display for HydrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HydrationPolicy::PersistedWins => write!(f, "persisted_wins"),
            HydrationPolicy::LocalWins => write!(f, "local_wins"),
        }
    }
}

impl FromStr for HydrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persisted_wins" => Ok(HydrationPolicy::PersistedWins),
            "local_wins" => Ok(HydrationPolicy::LocalWins),
            other => Err(format!(
                "Unknown hydration policy: '{}'. Valid policies: persisted_wins, local_wins",
                other
            )),
        }
    }
}

/// Store settings.
#[derive(Debug, Clone)]
pub struct ShopStoreConfig {
    /// Slot key the state is persisted under.
    pub state_key: String,

    pub hydration_policy: HydrationPolicy,
}

impl Default for ShopStoreConfig {
    fn default() -> Self {
        ShopStoreConfig {
            state_key: DEFAULT_STATE_KEY.to_string(),
            hydration_policy: HydrationPolicy::default(),
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Uninitialized,
    Ready,
}

/// What a call to [`ShopStore::hydrate`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The slot was empty; the store keeps its current state.
    NoSavedState,

    /// The slot could not be read or parsed; the store keeps its current state.
    Unreadable,

    /// The persisted record was loaded.
    Loaded {
        cart_lines: usize,
        wishlist_entries: usize,
        /// Mutations made before hydration that the record replaced.
        discarded_mutations: u64,
    },

    /// The persisted record was ignored in favour of earlier local mutations.
    KeptLocal { mutations: u64 },

    /// The store was already hydrated; nothing was read.
    AlreadyReady,
}

// =============================================================================
// Store
// =============================================================================

struct Shared {
    state: ShopState,
    lifecycle: Lifecycle,
    /// Mutations applied while `Uninitialized`.
    early_mutations: u64,
}

struct Inner {
    shared: Mutex<Shared>,
    persist: PersistHandle,
    kv: Arc<dyn KvStore>,
    config: ShopStoreConfig,
}

/// Cloneable handle to the shop state.
///
/// ## Example
/// ```rust,ignore
/// let store = ShopStore::new(Arc::new(db.kv()), ShopStoreConfig::default());
/// store.hydrate().await;
/// store.add_to_cart(product);
/// let badge = store.with_state(|s| s.cart_item_count());
/// ```
#[derive(Clone)]
pub struct ShopStore {
    inner: Arc<Inner>,
}

impl ShopStore {
    /// Creates an empty, uninitialized store and spawns its persist worker
    /// on the current tokio runtime.
    pub fn new(kv: Arc<dyn KvStore>, config: ShopStoreConfig) -> Self {
        let persist = PersistWorker::spawn(Arc::clone(&kv), config.state_key.clone());

        debug!(
            key = %config.state_key,
            policy = %config.hydration_policy,
            "Shop store created"
        );

        ShopStore {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    state: ShopState::new(),
                    lifecycle: Lifecycle::Uninitialized,
                    early_mutations: 0,
                }),
                persist,
                kv,
                config,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `intent`, schedules persistence, and returns the new state.
    pub fn dispatch(&self, intent: ShopIntent) -> ShopState {
        let mut shared = self.lock();
        Self::apply_locked(&mut shared, &self.inner.persist, intent)
    }

    /// Runs `decide` against the current state under the lock and applies
    /// the intent it returns, if any. `None` leaves the state untouched and
    /// schedules nothing.
    fn dispatch_with<F>(&self, decide: F) -> ShopState
    where
        F: FnOnce(&ShopState) -> Option<ShopIntent>,
    {
        let mut shared = self.lock();
        match decide(&shared.state) {
            Some(intent) => Self::apply_locked(&mut shared, &self.inner.persist, intent),
            None => shared.state.clone(),
        }
    }

    fn apply_locked(shared: &mut Shared, persist: &PersistHandle, intent: ShopIntent) -> ShopState {
        let name = intent.name();
        apply(&mut shared.state, intent);

        debug!(
            intent = name,
            cart_lines = shared.state.cart_items.len(),
            total = %shared.state.cart_total,
            "Applied shop intent"
        );

        let snapshot = shared.state.clone();
        match shared.lifecycle {
            Lifecycle::Ready => persist.schedule(snapshot.clone()),
            Lifecycle::Uninitialized => shared.early_mutations += 1,
        }
        snapshot
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> ShopState {
        self.lock().state.clone()
    }

    /// Runs `f` against the current state without copying it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ShopState) -> R) -> R {
        f(&self.lock().state)
    }

    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.with_state(|s| s.is_in_wishlist(id))
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lock().lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    pub fn add_to_cart(&self, product: Product) -> ShopState {
        self.dispatch(ShopIntent::AddToCart(product))
    }

    pub fn remove_from_cart(&self, id: ProductId) -> ShopState {
        self.dispatch(ShopIntent::RemoveFromCart { id })
    }

    pub fn update_quantity(&self, id: ProductId, quantity: i64) -> ShopState {
        self.dispatch(ShopIntent::UpdateQuantity { id, quantity })
    }

    /// Bumps an existing line by one. No-op when `id` is not in the cart.
    pub fn increment_quantity(&self, id: ProductId) -> ShopState {
        self.dispatch_with(|state| {
            state.cart_line(id).map(|line| ShopIntent::UpdateQuantity {
                id,
                quantity: line.quantity.saturating_add(1),
            })
        })
    }

    /// Lowers an existing line by one; a line at quantity 1 is removed.
    pub fn decrement_quantity(&self, id: ProductId) -> ShopState {
        self.dispatch_with(|state| {
            state.cart_line(id).map(|line| ShopIntent::UpdateQuantity {
                id,
                quantity: line.quantity - 1,
            })
        })
    }

    pub fn clear_cart(&self) -> ShopState {
        self.dispatch(ShopIntent::ClearCart)
    }

    /// Empties the cart and returns the state as it was just before, in one
    /// step under the lock. An empty cart is returned as is and nothing is
    /// scheduled.
    pub fn take_cart(&self) -> ShopState {
        let mut shared = self.lock();
        let taken = shared.state.clone();
        if !taken.cart_is_empty() {
            Self::apply_locked(&mut shared, &self.inner.persist, ShopIntent::ClearCart);
        }
        taken
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    pub fn add_to_wishlist(&self, product: Product) -> ShopState {
        self.dispatch(ShopIntent::AddToWishlist(product))
    }

    pub fn remove_from_wishlist(&self, id: ProductId) -> ShopState {
        self.dispatch(ShopIntent::RemoveFromWishlist { id })
    }

    /// Adds `product` if absent, removes it if present. Returns whether it
    /// is on the wishlist afterwards.
    pub fn toggle_wishlist(&self, product: Product) -> bool {
        let id = product.id;
        let state = self.dispatch_with(move |state| {
            if state.is_in_wishlist(id) {
                Some(ShopIntent::RemoveFromWishlist { id })
            } else {
                Some(ShopIntent::AddToWishlist(product))
            }
        });
        state.is_in_wishlist(id)
    }

    /// Adds the wishlisted product `id` to the cart. The wishlist entry stays.
    pub fn move_to_cart(&self, id: ProductId) -> CoreResult<ShopState> {
        let mut found = false;
        let state = self.dispatch_with(|state| {
            let entry = state.wishlist_entry(id)?;
            found = true;
            Some(ShopIntent::AddToCart(entry.product().clone()))
        });

        if found {
            Ok(state)
        } else {
            Err(CoreError::ProductNotFound(id))
        }
    }

    /// Replaces the whole state with `state` (normalised).
    pub fn load(&self, state: ShopState) -> ShopState {
        self.dispatch(ShopIntent::Load(state))
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    /// Reads the persisted record once and moves the store to `Ready`.
    ///
    /// Never fails: a missing, unreadable or malformed record leaves the
    /// current state in place.
    pub async fn hydrate(&self) -> HydrationOutcome {
        if self.is_ready() {
            debug!("Shop store already hydrated");
            return HydrationOutcome::AlreadyReady;
        }

        let key = &self.inner.config.state_key;
        let loaded = match self.inner.kv.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ShopState>(&raw) {
                Ok(state) => Some(state),
                Err(e) => {
                    let err = StoreError::from(e);
                    warn!(key = %key, error = %err, "Persisted shop state is unreadable; starting empty");
                    None
                }
            },
            Ok(None) => {
                info!(key = %key, "No persisted shop state");
                return self.finish_hydration(HydrationOutcome::NoSavedState);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read persisted shop state; starting empty");
                None
            }
        };

        let Some(loaded) = loaded else {
            return self.finish_hydration(HydrationOutcome::Unreadable);
        };

        let mut shared = self.lock();
        if shared.lifecycle == Lifecycle::Ready {
            return HydrationOutcome::AlreadyReady;
        }

        let early = shared.early_mutations;
        shared.lifecycle = Lifecycle::Ready;

        match self.inner.config.hydration_policy {
            HydrationPolicy::LocalWins if early > 0 => {
                info!(
                    mutations = early,
                    "Keeping local changes made before hydration; persisted state ignored"
                );
                self.inner.persist.schedule(shared.state.clone());
                HydrationOutcome::KeptLocal { mutations: early }
            }
            _ => {
                if early > 0 {
                    warn!(
                        discarded = early,
                        "Persisted state replaced changes made before hydration"
                    );
                }
                let state =
                    Self::apply_locked(&mut shared, &self.inner.persist, ShopIntent::Load(loaded));
                info!(
                    cart_lines = state.cart_items.len(),
                    wishlist = state.wishlist_items.len(),
                    total = %state.cart_total,
                    "Hydrated shop state"
                );
                HydrationOutcome::Loaded {
                    cart_lines: state.cart_items.len(),
                    wishlist_entries: state.wishlist_items.len(),
                    discarded_mutations: early,
                }
            }
        }
    }

    /// Moves to `Ready` without a record to load. Early mutations were held
    /// back from the slot, so the state they produced is queued now.
    fn finish_hydration(&self, outcome: HydrationOutcome) -> HydrationOutcome {
        let mut shared = self.lock();
        if shared.lifecycle == Lifecycle::Ready {
            return HydrationOutcome::AlreadyReady;
        }
        shared.lifecycle = Lifecycle::Ready;
        if shared.early_mutations > 0 {
            self.inner.persist.schedule(shared.state.clone());
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    pub fn persist_status(&self) -> PersistStatus {
        self.inner.persist.status()
    }

    /// Waits until every state produced so far has been written (or failed).
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.inner.persist.flush().await
    }

    /// Writes pending state and stops the persist worker. Later mutations
    /// still apply in memory but are no longer saved.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        info!("Shutting down shop store persistence");
        self.inner.persist.shutdown().await
    }
}

impl fmt::Debug for ShopStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("ShopStore")
            .field("lifecycle", &shared.lifecycle)
            .field("cart_lines", &shared.state.cart_items.len())
            .field("wishlist", &shared.state.wishlist_items.len())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::kv::MemoryKvStore;
    use crate::db::Database;
    use async_trait::async_trait;
    use storefront_core::Money;

    struct ReadOnlyKvStore;

    #[async_trait]
    impl KvStore for ReadOnlyKvStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::write(key, "read-only"))
        }
    }

    struct UnreachableKvStore;

    #[async_trait]
    impl KvStore for UnreachableKvStore {
        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::read(key, "device not ready"))
        }

        async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn product(id: ProductId, cents: i64) -> Product {
        Product::new(id, format!("Product {}", id), Money::from_cents(cents))
    }

    fn store_over(kv: Arc<MemoryKvStore>, policy: HydrationPolicy) -> ShopStore {
        ShopStore::new(
            kv,
            ShopStoreConfig {
                hydration_policy: policy,
                ..ShopStoreConfig::default()
            },
        )
    }

    fn persisted(kv: &MemoryKvStore) -> ShopState {
        serde_json::from_str(&kv.peek(DEFAULT_STATE_KEY).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_over(kv.clone(), HydrationPolicy::default());
        store.hydrate().await;

        store.add_to_cart(product(1, 999));
        store.add_to_cart(product(1, 999));
        store.add_to_wishlist(product(2, 500));
        store.flush().await.unwrap();

        let saved = persisted(&kv);
        assert_eq!(saved, store.snapshot());
        assert_eq!(saved.cart_total, Money::from_cents(1998));
    }

    #[tokio::test]
    async fn test_restart_restores_state() {
        let kv = Arc::new(MemoryKvStore::new());

        let first = store_over(kv.clone(), HydrationPolicy::default());
        first.hydrate().await;
        first.add_to_cart(product(1, 2230));
        first.update_quantity(1, 3);
        first.add_to_wishlist(product(4, 1599));
        first.shutdown().await.unwrap();
        let before = first.snapshot();

        let second = store_over(kv, HydrationPolicy::default());
        let outcome = second.hydrate().await;

        assert_eq!(
            outcome,
            HydrationOutcome::Loaded {
                cart_lines: 1,
                wishlist_entries: 1,
                discarded_mutations: 0
            }
        );
        assert_eq!(second.snapshot(), before);
        assert!(second.is_ready());
    }

    #[tokio::test]
    async fn test_restart_over_sqlite() {
        let db = Database::in_memory().await.unwrap();
        let kv: Arc<dyn KvStore> = Arc::new(db.kv());

        let first = ShopStore::new(kv.clone(), ShopStoreConfig::default());
        first.hydrate().await;
        first.add_to_cart(product(9, 64));
        first.flush().await.unwrap();

        let second = ShopStore::new(kv, ShopStoreConfig::default());
        second.hydrate().await;
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[tokio::test]
    async fn test_missing_slot_hydrates_empty() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());
        assert_eq!(store.lifecycle(), Lifecycle::Uninitialized);

        assert_eq!(store.hydrate().await, HydrationOutcome::NoSavedState);
        assert_eq!(store.snapshot(), ShopState::new());
        assert_eq!(store.lifecycle(), Lifecycle::Ready);
        assert_eq!(store.hydrate().await, HydrationOutcome::AlreadyReady);
    }

    #[tokio::test]
    async fn test_malformed_slot_hydrates_empty() {
        let kv = Arc::new(MemoryKvStore::with_entry(DEFAULT_STATE_KEY, "{not json"));
        let store = store_over(kv.clone(), HydrationPolicy::default());

        assert_eq!(store.hydrate().await, HydrationOutcome::Unreadable);
        assert_eq!(store.snapshot(), ShopState::new());
        assert!(store.is_ready());

        // Nothing is written back until the first mutation
        store.flush().await.unwrap();
        assert_eq!(kv.peek(DEFAULT_STATE_KEY).as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_unreadable_slot_hydrates_empty() {
        let store = ShopStore::new(Arc::new(UnreachableKvStore), ShopStoreConfig::default());
        assert_eq!(store.hydrate().await, HydrationOutcome::Unreadable);
        assert!(store.snapshot().cart_is_empty());
    }

    #[tokio::test]
    async fn test_partial_record_defaults_missing_fields() {
        let raw = r#"{"wishlistItems":[{"id":3,"title":"Jacket","price":55.99}]}"#;
        let store = store_over(
            Arc::new(MemoryKvStore::with_entry(DEFAULT_STATE_KEY, raw)),
            HydrationPolicy::default(),
        );
        store.hydrate().await;

        let state = store.snapshot();
        assert!(state.cart_items.is_empty());
        assert!(state.cart_total.is_zero());
        assert!(store.is_in_wishlist(3));
    }

    #[tokio::test]
    async fn test_persisted_wins_discards_early_mutations() {
        let saved = storefront_core::reduce(
            &ShopState::new(),
            ShopIntent::AddToWishlist(product(7, 100)),
        );
        let kv = Arc::new(MemoryKvStore::with_entry(
            DEFAULT_STATE_KEY,
            serde_json::to_string(&saved).unwrap(),
        ));
        let store = store_over(kv, HydrationPolicy::PersistedWins);

        store.add_to_cart(product(1, 999));
        let outcome = store.hydrate().await;

        assert_eq!(
            outcome,
            HydrationOutcome::Loaded {
                cart_lines: 0,
                wishlist_entries: 1,
                discarded_mutations: 1
            }
        );
        assert_eq!(store.snapshot(), saved);
    }

    #[tokio::test]
    async fn test_early_mutations_stay_out_of_slot_until_hydrated() {
        let saved = storefront_core::reduce(
            &ShopState::new(),
            ShopIntent::AddToWishlist(product(7, 100)),
        );
        let raw = serde_json::to_string(&saved).unwrap();
        let kv = Arc::new(MemoryKvStore::with_entry(DEFAULT_STATE_KEY, raw.clone()));
        let store = store_over(kv.clone(), HydrationPolicy::PersistedWins);

        store.add_to_cart(product(1, 999));
        store.flush().await.unwrap();
        assert_eq!(kv.peek(DEFAULT_STATE_KEY), Some(raw));
        assert_eq!(store.persist_status().writes_ok, 0);

        store.hydrate().await;
        store.flush().await.unwrap();
        assert_eq!(persisted(&kv), saved);
    }

    #[tokio::test]
    async fn test_early_mutations_saved_once_slot_found_empty() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_over(kv.clone(), HydrationPolicy::PersistedWins);

        store.add_to_cart(product(1, 999));
        store.flush().await.unwrap();
        assert!(kv.peek(DEFAULT_STATE_KEY).is_none());

        assert_eq!(store.hydrate().await, HydrationOutcome::NoSavedState);
        store.flush().await.unwrap();
        assert!(persisted(&kv).is_in_cart(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_saved_record_survives_early_mutation_over_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let db = Database::open(&path).await.unwrap();
        let first = ShopStore::new(Arc::new(db.kv()), ShopStoreConfig::default());
        first.hydrate().await;
        first.add_to_wishlist(product(7, 100));
        first.shutdown().await.unwrap();
        db.close().await;

        let db = Database::open(&path).await.unwrap();
        let second = ShopStore::new(Arc::new(db.kv()), ShopStoreConfig::default());
        second.add_to_cart(product(1, 999));
        // Give the worker every chance to write before the slot is read.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let outcome = second.hydrate().await;
        assert_eq!(
            outcome,
            HydrationOutcome::Loaded {
                cart_lines: 0,
                wishlist_entries: 1,
                discarded_mutations: 1
            }
        );
        assert!(second.is_in_wishlist(7));
        assert!(!second.snapshot().is_in_cart(1));

        second.flush().await.unwrap();
        let raw = db.kv().get(DEFAULT_STATE_KEY).await.unwrap().unwrap();
        let on_disk: ShopState = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, second.snapshot());
        second.shutdown().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_local_wins_keeps_early_mutations() {
        let saved = storefront_core::reduce(
            &ShopState::new(),
            ShopIntent::AddToWishlist(product(7, 100)),
        );
        let kv = Arc::new(MemoryKvStore::with_entry(
            DEFAULT_STATE_KEY,
            serde_json::to_string(&saved).unwrap(),
        ));
        let store = store_over(kv.clone(), HydrationPolicy::LocalWins);

        store.add_to_cart(product(1, 999));
        assert_eq!(store.hydrate().await, HydrationOutcome::KeptLocal { mutations: 1 });
        assert!(store.snapshot().is_in_cart(1));
        assert!(!store.is_in_wishlist(7));

        store.flush().await.unwrap();
        assert_eq!(persisted(&kv), store.snapshot());
    }

    #[tokio::test]
    async fn test_local_wins_loads_when_untouched() {
        let saved = storefront_core::reduce(&ShopState::new(), ShopIntent::AddToCart(product(2, 50)));
        let kv = Arc::new(MemoryKvStore::with_entry(
            DEFAULT_STATE_KEY,
            serde_json::to_string(&saved).unwrap(),
        ));
        let store = store_over(kv, HydrationPolicy::LocalWins);

        assert!(matches!(store.hydrate().await, HydrationOutcome::Loaded { .. }));
        assert_eq!(store.snapshot(), saved);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = ShopStore::new(Arc::new(ReadOnlyKvStore), ShopStoreConfig::default());
        store.hydrate().await;

        let state = store.add_to_cart(product(1, 999));
        store.flush().await.unwrap();

        assert_eq!(store.snapshot(), state);
        assert_eq!(store.snapshot().cart_total, Money::from_cents(999));
        assert_eq!(store.persist_status().writes_failed, 1);
    }

    #[tokio::test]
    async fn test_stepper() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());
        store.add_to_cart(product(1, 250));

        let state = store.increment_quantity(1);
        assert_eq!(state.cart_quantity_of(1), 2);
        assert_eq!(state.cart_total, Money::from_cents(500));

        store.decrement_quantity(1);
        let state = store.decrement_quantity(1);
        assert!(!state.is_in_cart(1));
        assert!(state.cart_total.is_zero());

        // Unknown ids are untouched
        assert_eq!(store.increment_quantity(42), ShopState::new());
    }

    #[tokio::test]
    async fn test_huge_quantity_keeps_total_consistent() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());
        store.hydrate().await;
        store.add_to_cart(product(1, 999));

        let state = store.update_quantity(1, i64::MAX / 2);
        assert_eq!(state.cart_total, Money::from_cents(i64::MAX));

        store.update_quantity(1, i64::MAX);
        let state = store.increment_quantity(1);
        assert_eq!(state.cart_quantity_of(1), i64::MAX);

        let state = store.snapshot();
        assert_eq!(state.cart_total, state.computed_total());
    }

    #[tokio::test]
    async fn test_toggle_and_move_to_cart() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());

        assert!(store.toggle_wishlist(product(5, 695)));
        assert!(store.is_in_wishlist(5));

        let state = store.move_to_cart(5).unwrap();
        assert_eq!(state.cart_quantity_of(5), 1);
        assert!(state.is_in_wishlist(5));

        assert!(!store.toggle_wishlist(product(5, 695)));
        assert!(matches!(store.move_to_cart(5), Err(CoreError::ProductNotFound(5))));
    }

    #[tokio::test]
    async fn test_take_cart_returns_lines_and_empties_cart() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_over(kv.clone(), HydrationPolicy::default());
        store.hydrate().await;
        store.add_to_cart(product(1, 999));
        store.add_to_cart(product(2, 250));
        store.add_to_wishlist(product(3, 100));

        let taken = store.take_cart();
        assert_eq!(taken.cart_items.len(), 2);
        assert_eq!(taken.cart_total, Money::from_cents(1249));

        store.flush().await.unwrap();
        let state = store.snapshot();
        assert!(state.cart_is_empty());
        assert!(state.is_in_wishlist(3));
        assert_eq!(persisted(&kv), state);

        assert!(store.take_cart().cart_is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_take_cart_hands_each_line_out_once() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());
        store.hydrate().await;
        store.add_to_cart(product(1, 999));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take_cart().cart_item_count() })
            })
            .collect();
        let mut handed_out = 0;
        for task in tasks {
            handed_out += task.await.unwrap();
        }

        assert_eq!(handed_out, 1);
        assert!(store.snapshot().cart_is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = store_over(Arc::new(MemoryKvStore::new()), HydrationPolicy::default());
        let other = store.clone();

        other.add_to_cart(product(1, 100));
        assert!(store.snapshot().is_in_cart(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_keep_total_consistent() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_over(kv.clone(), HydrationPolicy::default());
        store.hydrate().await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..25 {
                        store.add_to_cart(product(1, 999));
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        store.flush().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.cart_quantity_of(1), 200);
        assert_eq!(state.cart_total, Money::from_cents(999 * 200));
        assert_eq!(persisted(&kv), state);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("local_wins".parse::<HydrationPolicy>(), Ok(HydrationPolicy::LocalWins));
        assert_eq!(
            HydrationPolicy::PersistedWins.to_string().parse::<HydrationPolicy>(),
            Ok(HydrationPolicy::PersistedWins)
        );
        assert!("merge".parse::<HydrationPolicy>().is_err());
    }
}
