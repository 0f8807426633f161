//! # storefront-catalog: Product Catalog Client
//!
//! Read-only access to the catalog the product list, detail and category
//! screens browse. Everything the catalog returns passes through
//! `storefront_core::validation` before a screen sees it.
//!
//! ## Module Structure
//! ```text
//! storefront_catalog/
//! ├── config.rs  ← CatalogConfig ([catalog] section)
//! ├── client.rs  ← CatalogClient (reqwest)
//! └── error.rs   ← CatalogError, is_retryable()
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::CatalogClient;
pub use config::{CatalogConfig, DEFAULT_BASE_URL};
pub use error::{CatalogError, CatalogResult};
