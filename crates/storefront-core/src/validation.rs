//! # Validation Module
//!
//! Checks applied to catalog records before they reach the screens or the
//! cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Field types, required keys                                        │
//! │  └── Prices converted to cents                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog client                                               │
//! │  └── THIS MODULE: record shape rules (title, price, rating)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Shop transitions                                             │
//! │  └── Total functions: bad ids and quantities are no-ops, not errors    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, Rating};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest rating the catalog can report.
pub const MAX_RATING: f64 = 5.0;

/// Longest title the screens will lay out.
pub const MAX_TITLE_LEN: usize = 500;

/// Validates a product title.
///
/// ## Rules
/// - Must not be blank
/// - At most 500 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Blank { field: "title" });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title",
            limit: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates a unit price (≥ 0).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative { field: "price" });
    }
    Ok(())
}

/// Validates a rating (`rate` between 0 and 5, finite).
pub fn validate_rating(rating: &Rating) -> ValidationResult<()> {
    if !rating.rate.is_finite() || !(0.0..=MAX_RATING).contains(&rating.rate) {
        return Err(ValidationError::OutOfRange {
            field: "rating.rate",
            value: rating.rate,
            min: 0.0,
            max: MAX_RATING,
        });
    }
    Ok(())
}

/// Validates a catalog product id (positive).
pub fn validate_product_id(id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::NotPositive { field: "id" });
    }
    Ok(())
}

/// Validates a whole catalog record.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_product;
/// use storefront_core::{Money, Product};
///
/// assert!(validate_product(&Product::new(1, "Backpack", Money::from_cents(10995))).is_ok());
/// assert!(validate_product(&Product::new(1, "  ", Money::from_cents(100))).is_err());
/// ```
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(product.id)?;
    validate_title(&product.title)?;
    validate_price(product.price)?;
    validate_rating(&product.rating)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
