//! # Storefront App Shell
//!
//! Startup, configuration and the commands the screens call.
//!
//! ## Module Organization
//! ```text
//! storefront/
//! ├── lib.rs          ◄─── You are here (logging + start)
//! ├── config.rs       ◄─── AppConfig (TOML)
//! ├── state.rs        ◄─── AppState: ShopStore + CatalogClient + Database
//! ├── error.rs        ◄─── ApiError for commands, StartupError
//! └── commands/
//!     ├── cart.rs     ◄─── Cart screen + header badge
//!     ├── wishlist.rs ◄─── Wishlist screen + heart buttons
//!     └── catalog.rs  ◄─── Product list, detail, categories
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let app = storefront::start(None).await?;
//! let cart = storefront::commands::cart::add_to_cart(&app.store, product);
//! let products = storefront::commands::catalog::list_products(
//!     &app.catalog, None, Some("jacket".into()), None,
//! ).await?;
//! app.shutdown().await;
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{ApiError, ErrorCode, StartupError};
pub use state::AppState;

/// Loads configuration, initializes logging and builds the app state.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. AppConfig::load(path) ──── TOML file or defaults, validated         │
/// │  2. init_tracing ───────────── filter from [logging]                    │
/// │  3. AppState::start ────────── database, catalog client, hydrated store │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn start(config_path: Option<PathBuf>) -> Result<AppState, StartupError> {
    let config = AppConfig::load(config_path)?;
    init_tracing(&config.logging.filter);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        catalog = %config.catalog.base_url,
        "Starting storefront"
    );

    AppState::start(config).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// The filter comes from configuration only. An invalid filter falls back
/// to `info`. A second call is a no-op.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        debug!("Tracing subscriber already installed");
    }
}
