//! # App Configuration
//!
//! One TOML file configures the whole shell.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Resolution                            │
//! │                                                                         │
//! │  AppConfig::load(path)                                                 │
//! │       │                                                                 │
//! │       ├── explicit path given ──────────► read it                      │
//! │       ├── else <config dir>/storefront.toml                            │
//! │       │      macOS:   ~/Library/Application Support/com.storefront.app │
//! │       │      Linux:   ~/.config/storefront                             │
//! │       │      Windows: %APPDATA%\storefront\app\config                  │
//! │       └── file missing ─────────────────► built-in defaults            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [catalog]
//! base_url = "https://fakestoreapi.com"
//! timeout_secs = 10
//! user_agent = "storefront/0.1.0"
//!
//! [storage]
//! database_path = "/path/to/storefront.db"  # optional
//! state_key = "shopData"
//!
//! [hydration]
//! policy = "persisted_wins"                 # or "local_wins"
//!
//! [logging]
//! filter = "info,storefront=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use storefront_catalog::CatalogConfig;
use storefront_core::DEFAULT_STATE_KEY;
use storefront_store::{HydrationPolicy, ShopStoreConfig};

const CONFIG_FILE_NAME: &str = "storefront.toml";
const DATABASE_FILE_NAME: &str = "storefront.db";

// =============================================================================
// Errors
// =============================================================================

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a platform data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[storage]`: where the shop record is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file. Defaults to `storefront.db` in the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Slot key the shop record is stored under.
    #[serde(default = "default_state_key")]
    pub state_key: String,
}

fn default_state_key() -> String {
    DEFAULT_STATE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database_path: None,
            state_key: default_state_key(),
        }
    }
}

/// `[hydration]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationConfig {
    #[serde(default)]
    pub policy: HydrationPolicy,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,storefront=debug,sqlx=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub hydration: HydrationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from `config_path`, or the platform default path.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - catalog base URL parses as http(s), timeout > 0
    /// - state key is not blank
    /// - log filter parses
    pub fn validate(&self) -> ConfigResult<()> {
        self.catalog
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.storage.state_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.state_key must not be empty".to_string(),
            ));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            ConfigError::Invalid(format!(
                "logging.filter '{}' is not a valid filter: {}",
                self.logging.filter, e
            ))
        })?;

        Ok(())
    }

    /// `<config dir>/storefront.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Resolves the database file, creating the default data directory when
    /// no explicit path is configured.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    /// Settings for the ShopStore.
    pub fn store_config(&self) -> ShopStoreConfig {
        ShopStoreConfig {
            state_key: self.storage.state_key.clone(),
            hydration_policy: self.hydration.policy,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "storefront", "app")
}

// =============================================================================
// Unit Tests
// =============================================================================
