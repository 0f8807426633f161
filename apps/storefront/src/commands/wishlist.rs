//! # Wishlist Commands
//!
//! Commands behind the wishlist screen and the heart buttons on product
//! cards and the detail screen.

use serde::Serialize;
use tracing::debug;

use storefront_core::{Product, ProductId, ShopState, WishlistEntry};
use storefront_store::ShopStore;

use crate::commands::cart::CartResponse;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub items: Vec<WishlistEntry>,
    pub count: usize,
}

impl From<ShopState> for WishlistResponse {
    fn from(state: ShopState) -> Self {
        WishlistResponse {
            count: state.wishlist_items.len(),
            items: state.wishlist_items,
        }
    }
}

/// Result of tapping a heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggle {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

pub fn get_wishlist(store: &ShopStore) -> WishlistResponse {
    debug!("get_wishlist command");
    store.snapshot().into()
}

/// Adds `product` unless it is already wishlisted.
pub fn add_to_wishlist(store: &ShopStore, product: Product) -> WishlistResponse {
    debug!(product_id = product.id, "add_to_wishlist command");
    store.add_to_wishlist(product).into()
}

pub fn remove_from_wishlist(store: &ShopStore, product_id: ProductId) -> WishlistResponse {
    debug!(product_id, "remove_from_wishlist command");
    store.remove_from_wishlist(product_id).into()
}

pub fn toggle_wishlist(store: &ShopStore, product: Product) -> WishlistToggle {
    let product_id = product.id;
    let in_wishlist = store.toggle_wishlist(product);
    debug!(product_id, in_wishlist, "toggle_wishlist command");
    WishlistToggle {
        product_id,
        in_wishlist,
    }
}

pub fn is_in_wishlist(store: &ShopStore, product_id: ProductId) -> bool {
    store.is_in_wishlist(product_id)
}

/// "Add to cart" on a wishlist card. The product stays on the wishlist.
///
/// ## Errors
/// `NOT_FOUND` when `product_id` is not wishlisted.
pub fn move_to_cart(store: &ShopStore, product_id: ProductId) -> Result<CartResponse, ApiError> {
    debug!(product_id, "move_to_cart command");
    Ok(store.move_to_cart(product_id)?.into())
}
