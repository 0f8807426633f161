//! # App State
//!
//! Everything the commands need, built once at startup and passed to them
//! explicitly.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       AppState::start(config)                           │
//! │                                                                         │
//! │  1. Resolve database path ── config or platform data dir                │
//! │  2. Database::open ───────── SQLite (WAL) + migrations                  │
//! │  3. CatalogClient::new ───── base URL, timeout, user agent              │
//! │  4. ShopStore::new ───────── spawns the persist worker                  │
//! │  5. store.hydrate() ──────── reads "shopData" once → Ready              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use storefront_catalog::CatalogClient;
use storefront_store::{
    Database, HydrationOutcome, KvStore, MemoryKvStore, ShopStore,
};

use crate::config::AppConfig;
use crate::error::StartupError;

/// Handles shared by every command. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: ShopStore,
    pub catalog: CatalogClient,
    pub config: Arc<AppConfig>,
    db: Option<Database>,
}

impl AppState {
    /// Opens the SQLite database and builds a hydrated store on top of it.
    pub async fn start(config: AppConfig) -> Result<Self, StartupError> {
        let db_path = config.database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::open(&db_path).await?;
        let kv: Arc<dyn KvStore> = Arc::new(db.kv());

        Self::assemble(config, kv, Some(db)).await
    }

    /// Builds a store that keeps state only for the life of the process.
    pub async fn ephemeral(config: AppConfig) -> Result<Self, StartupError> {
        warn!("Starting without local storage; the cart will not survive a restart");
        Self::assemble(config, Arc::new(MemoryKvStore::new()), None).await
    }

    async fn assemble(
        config: AppConfig,
        kv: Arc<dyn KvStore>,
        db: Option<Database>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let catalog = CatalogClient::new(&config.catalog)?;
        let store = ShopStore::new(kv, config.store_config());

        match store.hydrate().await {
            HydrationOutcome::Loaded { discarded_mutations, .. } if discarded_mutations > 0 => {
                warn!(discarded_mutations, "Hydration replaced early changes");
            }
            outcome => info!(?outcome, "Shop store ready"),
        }

        Ok(AppState {
            store,
            catalog,
            config: Arc::new(config),
            db,
        })
    }

    /// Flushes pending writes, stops the persist worker and closes the
    /// database.
    pub async fn shutdown(&self) {
        info!("Shutting down");

        if let Err(e) = self.store.shutdown().await {
            warn!(error = %e, "Persist worker did not shut down cleanly");
        }

        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{Money, Product};

    fn config_in(dir: &tempfile::TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.database_path = Some(dir.path().join("storefront.db"));
        config
    }

    #[tokio::test]
    async fn test_cart_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let app = AppState::start(config_in(&dir)).await.unwrap();
        assert!(app.store.is_ready());
        app.store
            .add_to_cart(Product::new(1, "Backpack", Money::from_cents(10995)));
        app.store
            .add_to_wishlist(Product::new(2, "T-Shirt", Money::from_cents(2230)));
        app.shutdown().await;

        let app = AppState::start(config_in(&dir)).await.unwrap();
        let state = app.store.snapshot();
        assert_eq!(state.cart_quantity_of(1), 1);
        assert_eq!(state.cart_total, Money::from_cents(10995));
        assert!(state.is_in_wishlist(2));
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_ephemeral_starts_empty() {
        let app = AppState::ephemeral(AppConfig::default()).await.unwrap();
        assert!(app.store.is_ready());
        assert!(app.store.snapshot().cart_is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.catalog.timeout_secs = 0;
        assert!(matches!(
            AppState::ephemeral(config).await,
            Err(StartupError::Config(_))
        ));
    }
}
