//! # Shop Transitions
//!
//! Intents and the pure transition function for the cart and wishlist.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Shop State Transitions                               │
//! │                                                                         │
//! │  Screen Action            ShopIntent                State Change        │
//! │  ─────────────            ──────────                ────────────        │
//! │                                                                         │
//! │  Add to cart ────────────► AddToCart(p) ──────────► push or qty + 1     │
//! │                                                                         │
//! │  Stepper +/- ────────────► UpdateQuantity ────────► qty = n (≤0 removes)│
//! │                                                                         │
//! │  Remove ─────────────────► RemoveFromCart ────────► lines.retain(..)    │
//! │                                                                         │
//! │  Clear / checkout ───────► ClearCart ─────────────► lines.clear()       │
//! │                                                                         │
//! │  Heart ──────────────────► AddToWishlist ─────────► push unless present │
//! │                            RemoveFromWishlist ────► entries.retain(..)  │
//! │                                                                         │
//! │  App start ──────────────► Load(state) ───────────► replace everything  │
//! │                                                                         │
//! │  Every cart change ends with recompute_total().                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition is total: unknown ids and repeated adds are no-ops or
//! merges, never errors.

use serde::{Deserialize, Serialize};

use crate::types::{CartLine, Product, ProductId, ShopState, WishlistEntry};

// =============================================================================
// Intent
// =============================================================================

/// Everything a screen can ask the shop to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShopIntent {
    /// Append a line with quantity 1, or bump an existing line by 1.
    AddToCart(Product),

    /// Delete the line for `id`, if present.
    RemoveFromCart { id: ProductId },

    /// Set the quantity of the line for `id`. `quantity <= 0` removes it.
    UpdateQuantity { id: ProductId, quantity: i64 },

    /// Empty the cart. The wishlist is untouched.
    ClearCart,

    /// Append to the wishlist unless the id is already there.
    AddToWishlist(Product),

    /// Delete the wishlist entry for `id`, if present.
    RemoveFromWishlist { id: ProductId },

    /// Replace the whole state with a hydrated record.
    Load(ShopState),
}

impl ShopIntent {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ShopIntent::AddToCart(_) => "add_to_cart",
            ShopIntent::RemoveFromCart { .. } => "remove_from_cart",
            ShopIntent::UpdateQuantity { .. } => "update_quantity",
            ShopIntent::ClearCart => "clear_cart",
            ShopIntent::AddToWishlist(_) => "add_to_wishlist",
            ShopIntent::RemoveFromWishlist { .. } => "remove_from_wishlist",
            ShopIntent::Load(_) => "load",
        }
    }
}

// =============================================================================
// Reducer
// =============================================================================

/// Computes the state that follows `state` under `intent`.
///
/// Pure: the input is never modified and the same inputs always give the same
/// output.
///
/// ## Example
/// ```rust
/// use storefront_core::{reduce, Money, Product, ShopIntent, ShopState};
///
/// let p = Product::new(1, "Mug", Money::from_cents(999));
/// let s = reduce(&ShopState::new(), ShopIntent::AddToCart(p));
/// let s = reduce(&s, ShopIntent::UpdateQuantity { id: 1, quantity: -5 });
/// assert!(s.cart_items.is_empty());
/// assert!(s.cart_total.is_zero());
/// ```
pub fn reduce(state: &ShopState, intent: ShopIntent) -> ShopState {
    let mut next = state.clone();
    apply(&mut next, intent);
    next
}

/// In-place form of [`reduce`], used by the store to avoid a second clone.
pub fn apply(state: &mut ShopState, intent: ShopIntent) {
    match intent {
        ShopIntent::AddToCart(product) => {
            match state.cart_items.iter_mut().find(|l| l.id() == product.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(1),
                None => state.cart_items.push(CartLine::new(product)),
            }
            state.recompute_total();
        }

        ShopIntent::RemoveFromCart { id } => {
            state.cart_items.retain(|l| l.id() != id);
            state.recompute_total();
        }

        ShopIntent::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                state.cart_items.retain(|l| l.id() != id);
            } else if let Some(line) = state.cart_items.iter_mut().find(|l| l.id() == id) {
                line.quantity = quantity;
            }
            state.recompute_total();
        }

        ShopIntent::ClearCart => {
            state.cart_items.clear();
            state.recompute_total();
        }

        ShopIntent::AddToWishlist(product) => {
            if !state.is_in_wishlist(product.id) {
                state.wishlist_items.push(WishlistEntry(product));
            }
        }

        ShopIntent::RemoveFromWishlist { id } => {
            state.wishlist_items.retain(|e| e.id() != id);
        }

        ShopIntent::Load(loaded) => {
            *state = loaded.normalized();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
