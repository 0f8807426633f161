//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate is the **heart** of the storefront. It contains the cart and
//! wishlist state container as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Screens (product list, detail, cart)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ intents                                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          ShopStore handle (storefront-store)                    │   │
//! │  │    dispatch ──► reduce ──► snapshot ──► persist worker          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   shop    │  │  catalog  │  │   │
//! │  │   │  Product  │  │   Money   │  │ ShopIntent│  │  search   │  │   │
//! │  │   │ ShopState │  │  (cents)  │  │  reduce   │  │   sort    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, WishlistEntry, ShopState)
//! - [`money`] - Prices and totals in whole cents
//! - [`shop`] - Intents and the pure transition function
//! - [`catalog`] - Product list search, sort and category filter
//! - [`error`] - Domain error types
//! - [`validation`] - Catalog record validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{reduce, Money, Product, ShopIntent, ShopState};
//!
//! let shirt = Product::new(1, "Shirt", Money::from_cents(999));
//!
//! let state = reduce(&ShopState::default(), ShopIntent::AddToCart(shirt.clone()));
//! let state = reduce(&state, ShopIntent::AddToCart(shirt));
//!
//! assert_eq!(state.cart_items.len(), 1);
//! assert_eq!(state.cart_total, Money::from_cents(1998));
//! assert_eq!(state.cart_total.to_string(), "$19.98");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod shop;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{CategoryFilter, SortOption};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use shop::{reduce, ShopIntent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key under which the whole [`ShopState`] is persisted.
///
/// One slot, one JSON record. Changing this orphans every saved cart.
pub const DEFAULT_STATE_KEY: &str = "shopData";
