//! # storefront-store: Persistence Slot + ShopStore Runtime
//!
//! Keeps the shop state in memory, routes every change through the pure
//! reducer in `storefront-core`, and mirrors the result to a single
//! key-value slot in the background.
//!
//! ## Module Structure
//! ```text
//! storefront_store/
//! ├── error.rs       ← StoreError, StoreResult
//! ├── kv.rs          ← KvStore trait, SqliteKvStore, MemoryKvStore
//! ├── db.rs          ← Database: SqlitePool + embedded migrations
//! ├── persist.rs     ← PersistWorker / PersistHandle (tokio task)
//! └── store.rs       ← ShopStore, HydrationPolicy, Lifecycle
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::open(path).await?;
//! let store = ShopStore::new(Arc::new(db.kv()), ShopStoreConfig::default());
//! store.hydrate().await;
//! store.add_to_cart(product);
//! ```

pub mod db;
pub mod error;
pub mod kv;
pub mod persist;
pub mod store;

pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use kv::{KvStore, MemoryKvStore, SqliteKvStore};
pub use persist::{PersistHandle, PersistStatus, PersistWorker};
pub use store::{HydrationOutcome, HydrationPolicy, Lifecycle, ShopStore, ShopStoreConfig};
