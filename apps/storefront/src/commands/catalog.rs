//! # Catalog Commands
//!
//! Commands behind the product list, product detail and category screens.
//!
//! ## Product List Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_products(category, query, sort)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogClient::fetch_products(category) ── "all"/None → whole catalog │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products(query) ── title/description, case-insensitive          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sort_products(sort) ── default | price-low-high | price-high-low |     │
//! │                         rating                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use storefront_catalog::CatalogClient;
use storefront_core::catalog::{search_products, sort_products};
use storefront_core::{Product, ProductId, SortOption};
use storefront_store::ShopStore;

use crate::error::ApiError;

/// Product detail screen: the product plus where it sits in the shop state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,

    /// Units of this product in the cart, 0 if none.
    pub cart_quantity: i64,

    pub in_wishlist: bool,
}

/// Lists products for the product list screen.
///
/// ## Arguments
/// * `category` - Category name; `None` or `"all"` for everything
/// * `query` - Search text; blank matches everything
/// * `sort` - Sort option name; `None` for catalog order
///
/// ## Errors
/// `VALIDATION_ERROR` for an unknown sort name, `FETCH_ERROR` when the
/// catalog cannot be reached.
pub async fn list_products(
    catalog: &CatalogClient,
    category: Option<String>,
    query: Option<String>,
    sort: Option<String>,
) -> Result<Vec<Product>, ApiError> {
    debug!(?category, ?query, ?sort, "list_products command");

    let sort = match sort.as_deref() {
        Some(name) => name.parse::<SortOption>().map_err(ApiError::validation)?,
        None => SortOption::Default,
    };

    let mut products = catalog.fetch_products(category.as_deref()).await?;

    if let Some(query) = query.as_deref() {
        products = search_products(&products, query);
    }
    sort_products(&mut products, sort);

    Ok(products)
}

/// Loads one product for the detail screen.
pub async fn get_product(
    catalog: &CatalogClient,
    store: &ShopStore,
    product_id: ProductId,
) -> Result<ProductDetail, ApiError> {
    debug!(product_id, "get_product command");

    let product = catalog.fetch_product_by_id(product_id).await?;
    let (cart_quantity, in_wishlist) = store.with_state(|state| {
        (
            state.cart_quantity_of(product_id),
            state.is_in_wishlist(product_id),
        )
    });

    Ok(ProductDetail {
        product,
        cart_quantity,
        in_wishlist,
    })
}

pub async fn list_categories(catalog: &CatalogClient) -> Result<Vec<String>, ApiError> {
    debug!("list_categories command");
    Ok(catalog.fetch_categories().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use storefront_catalog::CatalogConfig;
    use storefront_store::{MemoryKvStore, ShopStoreConfig};
    use tokio::net::TcpListener;

    fn products_json() -> Value {
        json!([
            { "id": 1, "title": "Backpack", "price": 109.95, "category": "men's clothing",
              "description": "Fits 15 inch laptops", "rating": { "rate": 3.9, "count": 120 } },
            { "id": 2, "title": "Slim Fit T-Shirt", "price": 22.3, "category": "men's clothing",
              "description": "Slim-fitting style", "rating": { "rate": 4.1, "count": 259 } },
            { "id": 3, "title": "Cotton Jacket", "price": 55.99, "category": "men's clothing",
              "description": "Great outerwear", "rating": { "rate": 4.7, "count": 500 } },
            { "id": 9, "title": "Portable Hard Drive", "price": 64, "category": "electronics",
              "description": "USB 3.0", "rating": { "rate": 3.3, "count": 203 } }
        ])
    }

    async fn by_id(Path(id): Path<i64>) -> Response {
        let found = products_json()
            .as_array()
            .and_then(|all| all.iter().find(|p| p["id"] == id).cloned());
        match found {
            Some(product) => Json(product).into_response(),
            None => (StatusCode::OK, "").into_response(),
        }
    }

    async fn by_category(Path(name): Path<String>) -> Json<Value> {
        let matching: Vec<Value> = products_json()
            .as_array()
            .into_iter()
            .flatten()
            .filter(|p| p["category"] == name.as_str())
            .cloned()
            .collect();
        Json(Value::Array(matching))
    }

    async fn spawn_catalog() -> CatalogClient {
        let app = Router::new()
            .route("/products", get(|| async { Json(products_json()) }))
            .route(
                "/products/categories",
                get(|| async { Json(json!(["electronics", "men's clothing"])) }),
            )
            .route("/products/category/{name}", get(by_category))
            .route("/products/{id}", get(by_id))
            .route(
                "/down/products",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        CatalogClient::new(&CatalogConfig::with_base_url(format!("http://{}", addr))).unwrap()
    }

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_list_products_pipeline() {
        let catalog = spawn_catalog().await;

        let all = list_products(&catalog, None, None, None).await.unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3, 9]);

        let cheapest_first = list_products(&catalog, Some("all".into()), None, Some("price-low-high".into()))
            .await
            .unwrap();
        assert_eq!(ids(&cheapest_first), vec![2, 3, 9, 1]);

        let clothing_by_rating = list_products(
            &catalog,
            Some("men's clothing".into()),
            None,
            Some("rating".into()),
        )
        .await
        .unwrap();
        assert_eq!(ids(&clothing_by_rating), vec![3, 2, 1]);

        let search = list_products(&catalog, None, Some("LAPTOP".into()), None)
            .await
            .unwrap();
        assert_eq!(ids(&search), vec![1]);
    }

    #[tokio::test]
    async fn test_unknown_sort_is_validation_error() {
        let catalog = spawn_catalog().await;
        let err = list_products(&catalog, None, None, Some("cheapest".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unavailable_catalog_is_retryable_fetch_error() {
        let catalog = spawn_catalog().await;
        let down = CatalogClient::new(&CatalogConfig::with_base_url(format!(
            "{}down",
            catalog.base_url()
        )))
        .unwrap();

        let err = list_products(&down, None, None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FetchError);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_get_product_reports_shop_state() {
        let catalog = spawn_catalog().await;
        let store = ShopStore::new(Arc::new(MemoryKvStore::new()), ShopStoreConfig::default());

        let detail = get_product(&catalog, &store, 3).await.unwrap();
        assert_eq!(detail.cart_quantity, 0);
        assert!(!detail.in_wishlist);

        store.add_to_cart(detail.product.clone());
        store.add_to_cart(detail.product.clone());
        store.add_to_wishlist(detail.product.clone());

        let detail = get_product(&catalog, &store, 3).await.unwrap();
        assert_eq!(detail.cart_quantity, 2);
        assert!(detail.in_wishlist);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Cotton Jacket");
        assert_eq!(json["cartQuantity"], 2);

        let err = get_product(&catalog, &store, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_categories() {
        let catalog = spawn_catalog().await;
        assert_eq!(
            list_categories(&catalog).await.unwrap(),
            vec!["electronics", "men's clothing"]
        );
    }
}
