//! # Catalog Browsing
//!
//! Pure helpers behind the product list screen: text search, sort order and
//! category selection. The product list itself comes from the catalog client;
//! nothing here touches the network.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::types::Product;

// =============================================================================
// Search
// =============================================================================

/// Returns the products whose title or description contains `query`,
/// ignoring case. A blank query matches everything.
///
/// ## Example
/// ```rust
/// use storefront_core::catalog::search_products;
/// use storefront_core::{Money, Product};
///
/// let mut jacket = Product::new(3, "Cotton Jacket", Money::from_cents(5599));
/// jacket.description = "great outerwear jackets for spring".into();
/// let ring = Product::new(5, "Silver Ring", Money::from_cents(695));
///
/// let hits = search_products(&[jacket, ring], "JACKET");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, 3);
/// ```
pub fn search_products(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

// =============================================================================
// Sort
// =============================================================================

/// Sort orders offered by the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SortOption {
    /// Catalog order (by id ascending).
    #[default]
    Default,

    PriceLowHigh,

    PriceHighLow,

    /// Highest rated first.
    Rating,
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOption::Default => write!(f, "default"),
            SortOption::PriceLowHigh => write!(f, "price-low-high"),
            SortOption::PriceHighLow => write!(f, "price-high-low"),
            SortOption::Rating => write!(f, "rating"),
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "default" => Ok(SortOption::Default),
            "price-low-high" => Ok(SortOption::PriceLowHigh),
            "price-high-low" => Ok(SortOption::PriceHighLow),
            "rating" => Ok(SortOption::Rating),
            other => Err(format!(
                "Unknown sort option: '{}'. Valid options: default, price-low-high, price-high-low, rating",
                other
            )),
        }
    }
}

/// Sorts `products` in place. The sort is stable, so ties keep their order.
pub fn sort_products(products: &mut [Product], option: SortOption) {
    match option {
        SortOption::Default => products.sort_by_key(|p| p.id),
        SortOption::PriceLowHigh => products.sort_by_key(|p| p.price),
        SortOption::PriceHighLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOption::Rating => products.sort_by(|a, b| {
            b.rating
                .rate
                .partial_cmp(&a.rating.rate)
                .unwrap_or(Ordering::Equal)
        }),
    }
}

// =============================================================================
// Category Filter
// =============================================================================

/// Which slice of the catalog the list is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Builds a filter from the category chip the user tapped.
    /// `"all"` (any case) or an empty name selects everything.
    pub fn from_selection(selection: &str) -> Self {
        let trimmed = selection.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(trimmed.to_string())
        }
    }

    /// The category name to request from the catalog, `None` for all.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Named(name) => Some(name),
        }
    }

    /// True if `product` belongs to this slice.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => product.category == *name,
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(selection: Option<&str>) -> Self {
        selection.map_or(CategoryFilter::All, CategoryFilter::from_selection)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
