//! # Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who raises what                                                        │
//! │                                                                         │
//! │  storefront-core     CoreError, ValidationError    (this file)          │
//! │  storefront-store    StoreError      logged; the cart keeps working     │
//! │  storefront-catalog  CatalogError    shown with a retry button          │
//! │  storefront (app)    ApiError        serialized for the screens         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart and wishlist transitions are total, so nothing in [`crate::shop`]
//! returns these. They exist for the edges: records coming off the wire and
//! lookups by id.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id where one was expected, e.g. moving a
    /// wishlist entry that is no longer wishlisted.
    #[error("No product with id {0}")]
    ProductNotFound(i64),

    #[error("Invalid product record: {0}")]
    Validation(#[from] ValidationError),
}

/// A catalog record that does not have the shape of a product.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("`{field}` is blank")]
    Blank { field: &'static str },

    #[error("`{field}` is longer than {limit} characters")]
    TooLong { field: &'static str, limit: usize },

    #[error("`{field}` is negative")]
    Negative { field: &'static str },

    #[error("`{field}` must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("`{field}` is {value}, expected {min} to {max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
