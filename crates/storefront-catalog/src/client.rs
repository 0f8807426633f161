//! # Catalog Client
//!
//! Typed access to the product catalog API.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Request Flow                             │
//! │                                                                         │
//! │  fetch_products(Some("men's clothing"))                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  endpoint(["products", "category", "men's clothing"])                  │
//! │       │   segments are percent-encoded: /products/category/men's%20... │
//! │       ▼                                                                 │
//! │  reqwest GET (timeout + user agent from CatalogConfig)                 │
//! │       │                                                                 │
//! │       ├── send error ──────► Timeout | Transport   (retryable)         │
//! │       ├── non-2xx ─────────► Status                                    │
//! │       ▼                                                                 │
//! │  body → Vec<serde_json::Value> ── not JSON array ──► Decode            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per record: Product (serde) + validate_product                        │
//! │       ├── ok ───────► kept                                             │
//! │       └── invalid ──► skipped with a warning                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use storefront_core::validation::validate_product;
use storefront_core::{CategoryFilter, Product, ProductId};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};

/// HTTP client for the catalog API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
    timeout_secs: u64,
}

impl CatalogClient {
    /// Builds a client from validated settings.
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        let base = config.parsed_base_url()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CatalogError::ClientBuild)?;

        info!(base_url = %base, timeout_secs = config.timeout_secs, "Catalog client ready");

        Ok(CatalogClient {
            http,
            base,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Lists products, optionally limited to one category. `None` and
    /// `Some("all")` both list the whole catalog.
    pub async fn fetch_products(&self, category: Option<&str>) -> CatalogResult<Vec<Product>> {
        let filter = CategoryFilter::from(category);
        let url = match filter.as_category() {
            None => self.endpoint(&["products"])?,
            Some(name) => self.endpoint(&["products", "category", name])?,
        };

        let records: Vec<Value> = self.get_json(&url).await?;
        let received = records.len();

        let products: Vec<Product> = records
            .into_iter()
            .filter_map(|record| match parse_record(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping invalid catalog record");
                    None
                }
            })
            .collect();

        info!(
            category = filter.as_category().unwrap_or("all"),
            count = products.len(),
            skipped = received - products.len(),
            "Fetched products"
        );
        Ok(products)
    }

    /// Fetches one product.
    ///
    /// The catalog answers an unknown id with `200` and an empty body; that
    /// is reported as [`CatalogError::NotFound`].
    pub async fn fetch_product_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        if id <= 0 {
            return Err(CatalogError::NotFound(id));
        }

        let url = self.endpoint(&["products", &id.to_string()])?;
        let body = self.get_text(&url).await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(id));
        }

        let record: Value = decode(&url, trimmed)?;
        let product = parse_record(record)?;
        debug!(id, title = %product.title, "Fetched product");
        Ok(product)
    }

    /// Lists category names in catalog order.
    pub async fn fetch_categories(&self) -> CatalogResult<Vec<String>> {
        let url = self.endpoint(&["products", "categories"])?;
        let categories: Vec<String> = self.get_json(&url).await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> CatalogResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: &Url) -> CatalogResult<String> {
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Catalog request failed");
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.request_error(url, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> CatalogResult<T> {
        let body = self.get_text(url).await?;
        decode(url, &body)
    }

    fn request_error(&self, url: &Url, source: reqwest::Error) -> CatalogError {
        if source.is_timeout() {
            CatalogError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            CatalogError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Turns one JSON record into a validated product.
fn parse_record(record: Value) -> CatalogResult<Product> {
    let id = record.get("id").and_then(Value::as_i64).unwrap_or_default();

    let product: Product = serde_json::from_value(record).map_err(|e| CatalogError::InvalidRecord {
        id,
        reason: e.to_string(),
    })?;

    validate_product(&product).map_err(|e| CatalogError::InvalidRecord {
        id,
        reason: e.to_string(),
    })?;

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================
