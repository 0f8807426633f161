//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  WishlistEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product (flat) │   │  Product        │       │
//! │  │  title, price   │   │  quantity ≥ 1   │   │  (no quantity)  │       │
//! │  │  rating         │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘            │                     │                 │
//! │                                 ▼                     ▼                 │
//! │                    ┌─────────────────────────────────────────┐          │
//! │                    │               ShopState                 │          │
//! │                    │  cartItems · wishlistItems · cartTotal  │          │
//! │                    └─────────────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Layout
//! `ShopState` serializes to exactly the record the slot holds:
//! ```json
//! { "cartItems": [ { "id": 1, "title": "...", "price": 9.99, ..., "quantity": 2 } ],
//!   "wishlistItems": [ { "id": 3, "title": "...", ... } ],
//!   "cartTotal": 19.98 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;

/// Catalog identifier of a product.
pub type ProductId = i64;

// =============================================================================
// Product
// =============================================================================

/// Customer rating summary as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rating {
    /// Average rating, 0 to 5.
    pub rate: f64,

    /// Number of reviews.
    pub count: u32,
}

/// A product as served by the catalog API.
///
/// Read-only from the storefront's point of view. Cart lines and wishlist
/// entries hold a frozen copy taken when the product was first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,

    pub title: String,

    /// Unit price. Serialized as a decimal number.
    pub price: Money,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    /// Image URL.
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Creates a product with the given identity and price; every other field
    /// is empty.
    pub fn new(id: ProductId, title: impl Into<String>, price: Money) -> Self {
        Product {
            id,
            title: title.into(),
            price,
            description: String::new(),
            category: String::new(),
            image: String::new(),
            rating: Rating::default(),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart with its quantity.
///
/// ## Invariants
/// - At most one line per product id within a cart
/// - `quantity >= 1` (a transition that would make it lower removes the line)
///
/// ## Price Freezing
/// The product fields are captured when the line is created. Adding the same
/// id again only bumps the quantity; a newer product snapshot never
/// overwrites the stored price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,

    pub quantity: i64,
}

impl CartLine {
    /// Creates a new line with quantity 1.
    pub fn new(product: Product) -> Self {
        CartLine {
            product,
            quantity: 1,
        }
    }

    /// Product id of this line.
    #[inline]
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

// =============================================================================
// Wishlist Entry
// =============================================================================

/// A saved product. Serializes as the bare product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WishlistEntry(pub Product);

impl WishlistEntry {
    #[inline]
    pub fn id(&self) -> ProductId {
        self.0.id
    }

    #[inline]
    pub fn product(&self) -> &Product {
        &self.0
    }
}

impl From<Product> for WishlistEntry {
    fn from(product: Product) -> Self {
        WishlistEntry(product)
    }
}

// =============================================================================
// Shop State
// =============================================================================

/// The whole cart + wishlist state, exactly as persisted.
///
/// ## Invariant
/// `cart_total == Σ line.price × line.quantity` over `cart_items`. The total is
/// only ever assigned by [`ShopState::recompute_total`], which the reducer
/// calls after every change to the item sequence.
///
/// Missing fields deserialize to their empty/zero value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ShopState {
    /// Cart lines in insertion order.
    pub cart_items: Vec<CartLine>,

    /// Wishlist entries in insertion order.
    pub wishlist_items: Vec<WishlistEntry>,

    /// Derived: Σ price × quantity.
    pub cart_total: Money,
}

impl ShopState {
    /// Creates the empty state a process starts with.
    pub fn new() -> Self {
        Self::default()
    }

    /// Σ price × quantity over the current cart lines.
    pub fn computed_total(&self) -> Money {
        self.cart_items.iter().map(CartLine::line_total).sum()
    }

    /// Re-derives `cart_total` from `cart_items`.
    pub fn recompute_total(&mut self) {
        self.cart_total = self.computed_total();
    }

    /// Returns the cart line for `id`, if any.
    pub fn cart_line(&self, id: ProductId) -> Option<&CartLine> {
        self.cart_items.iter().find(|line| line.id() == id)
    }

    /// True if the cart holds a line for `id`.
    pub fn is_in_cart(&self, id: ProductId) -> bool {
        self.cart_line(id).is_some()
    }

    /// Quantity of `id` in the cart, 0 when absent.
    pub fn cart_quantity_of(&self, id: ProductId) -> i64 {
        self.cart_line(id).map_or(0, |line| line.quantity)
    }

    /// Total number of units in the cart (the header badge count).
    pub fn cart_item_count(&self) -> i64 {
        self.cart_items
            .iter()
            .fold(0i64, |count, line| count.saturating_add(line.quantity))
    }

    pub fn cart_is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }

    /// True iff some wishlist entry has this id.
    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.wishlist_items.iter().any(|entry| entry.id() == id)
    }

    /// Returns the wishlist entry for `id`, if any.
    pub fn wishlist_entry(&self, id: ProductId) -> Option<&WishlistEntry> {
        self.wishlist_items.iter().find(|entry| entry.id() == id)
    }

    pub fn wishlist_len(&self) -> usize {
        self.wishlist_items.len()
    }

    /// Re-establishes the state invariants on a record read from storage.
    ///
    /// - cart lines with `quantity <= 0` are dropped
    /// - duplicate ids keep their first occurrence (cart and wishlist)
    /// - `cart_total` is recomputed from the remaining lines
    ///
    /// A state produced by the reducer is returned unchanged.
    pub fn normalized(mut self) -> Self {
        let persisted_total = self.cart_total;

        let before = self.cart_items.len();
        let mut seen = HashSet::new();
        self.cart_items
            .retain(|line| line.quantity > 0 && seen.insert(line.id()));
        let dropped_lines = before - self.cart_items.len();

        let before = self.wishlist_items.len();
        let mut seen = HashSet::new();
        self.wishlist_items.retain(|entry| seen.insert(entry.id()));
        let dropped_entries = before - self.wishlist_items.len();

        if dropped_lines > 0 || dropped_entries > 0 {
            warn!(
                dropped_lines,
                dropped_entries, "Dropped invalid or duplicate records from persisted state"
            );
        }

        self.recompute_total();
        if self.cart_total != persisted_total {
            warn!(
                persisted = %persisted_total,
                recomputed = %self.cart_total,
                "Persisted cart total disagreed with cart lines; using recomputed total"
            );
        }

        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
