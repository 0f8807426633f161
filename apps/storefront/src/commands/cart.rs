//! # Cart Commands
//!
//! Commands behind the cart screen, the quantity stepper and the header
//! badge.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen Action            Command                 Store Call            │
//! │  ─────────────            ───────                 ──────────            │
//! │  "Add to cart" ─────────► add_to_cart ──────────► add_to_cart           │
//! │  Stepper + ─────────────► increment_cart_item ──► increment_quantity    │
//! │  Stepper - ─────────────► decrement_cart_item ──► decrement_quantity    │
//! │  Quantity field ────────► update_cart_item ─────► update_quantity       │
//! │  Trash icon ────────────► remove_from_cart ─────► remove_from_cart      │
//! │  "Clear" ───────────────► clear_cart ───────────► clear_cart            │
//! │  "Checkout" ────────────► checkout ─────────────► take_cart             │
//! │  Header badge ──────────► get_cart_count ───────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use storefront_core::{CartLine, Money, Product, ProductId, ShopState};
use storefront_store::{PersistStatus, ShopStore};

use crate::error::ApiError;

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub total: Money,
    /// Σ quantity (the header badge).
    pub item_count: i64,
}

impl From<&ShopState> for CartResponse {
    fn from(state: &ShopState) -> Self {
        CartResponse {
            items: state.cart_items.clone(),
            total: state.cart_total,
            item_count: state.cart_item_count(),
        }
    }
}

impl From<ShopState> for CartResponse {
    fn from(state: ShopState) -> Self {
        CartResponse {
            item_count: state.cart_item_count(),
            total: state.cart_total,
            items: state.cart_items,
        }
    }
}

/// Receipt for the demo checkout. No payment is taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub items: Vec<CartLine>,
    pub total: Money,
    pub item_count: i64,
    pub placed_at: DateTime<Utc>,
}

pub fn get_cart(store: &ShopStore) -> CartResponse {
    debug!("get_cart command");
    store.with_state(|state| CartResponse::from(state))
}

/// Units in the cart, for the header badge.
pub fn get_cart_count(store: &ShopStore) -> i64 {
    store.with_state(ShopState::cart_item_count)
}

/// Adds one unit of `product`; a product already in the cart keeps the
/// details it was first added with.
pub fn add_to_cart(store: &ShopStore, product: Product) -> CartResponse {
    debug!(product_id = product.id, "add_to_cart command");
    store.add_to_cart(product).into()
}

pub fn remove_from_cart(store: &ShopStore, product_id: ProductId) -> CartResponse {
    debug!(product_id, "remove_from_cart command");
    store.remove_from_cart(product_id).into()
}

/// Sets a line's quantity. Zero or less removes the line; an id not in the
/// cart is ignored.
pub fn update_cart_item(store: &ShopStore, product_id: ProductId, quantity: i64) -> CartResponse {
    debug!(product_id, quantity, "update_cart_item command");
    store.update_quantity(product_id, quantity).into()
}

pub fn increment_cart_item(store: &ShopStore, product_id: ProductId) -> CartResponse {
    debug!(product_id, "increment_cart_item command");
    store.increment_quantity(product_id).into()
}

/// Lowers a line by one; at quantity 1 the line is removed.
pub fn decrement_cart_item(store: &ShopStore, product_id: ProductId) -> CartResponse {
    debug!(product_id, "decrement_cart_item command");
    store.decrement_quantity(product_id).into()
}

pub fn clear_cart(store: &ShopStore) -> CartResponse {
    debug!("clear_cart command");
    store.clear_cart().into()
}

/// Demo checkout: returns what was in the cart and empties it.
///
/// ## Errors
/// `VALIDATION_ERROR` when the cart is empty.
pub fn checkout(store: &ShopStore) -> Result<CheckoutSummary, ApiError> {
    let cart = CartResponse::from(store.take_cart());
    if cart.items.is_empty() {
        return Err(ApiError::validation("Your cart is empty"));
    }

    info!(
        lines = cart.items.len(),
        units = cart.item_count,
        total = %cart.total,
        "Checkout completed"
    );

    Ok(CheckoutSummary {
        items: cart.items,
        total: cart.total,
        item_count: cart.item_count,
        placed_at: Utc::now(),
    })
}

/// Persistence diagnostics for the settings screen.
pub fn get_persist_status(store: &ShopStore) -> PersistStatus {
    store.persist_status()
}
