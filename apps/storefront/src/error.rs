//! # Command Errors
//!
//! Every command returns `Result<_, ApiError>`; the screens only ever see
//! this one shape.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow to the Screens                            │
//! │                                                                         │
//! │  CatalogError ──► FETCH_ERROR (retryable per is_retryable())            │
//! │               └─► NOT_FOUND   (unknown product id)                      │
//! │                                                                         │
//! │  CoreError ─────► NOT_FOUND / VALIDATION_ERROR                          │
//! │                                                                         │
//! │  StoreError ────► STORAGE_ERROR (flush / shutdown only; mutations       │
//! │                   never fail)                                           │
//! │                                                                         │
//! │  The screen shows `message` and offers a retry button when              │
//! │  `retryable` is true.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use storefront_catalog::CatalogError;
use storefront_core::CoreError;
use storefront_store::StoreError;

use crate::config::ConfigError;

/// Serialized as:
/// ```json
/// {
///   "code": "FETCH_ERROR",
///   "message": "Could not load products. Please try again.",
///   "retryable": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Stable code the screens branch on
    pub code: ErrorCode,

    /// Text shown to the shopper
    pub message: String,

    /// Whether the screen should offer a retry
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Catalog request failed
    FetchError,

    /// Product not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local storage operation failed
    StorageError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts catalog errors to API errors.
///
/// The user sees a generic message; the detail goes to the log.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => ApiError::not_found("Product", id),
            other => {
                error!(error = %other, "Catalog request failed");
                let retryable = other.is_retryable();
                let message = if retryable {
                    "Could not reach the store. Please try again."
                } else {
                    "The store returned something unexpected."
                };
                ApiError::new(ErrorCode::FetchError, message).retryable(retryable)
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Only flush and shutdown can produce these.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Storage operation failed");
        ApiError::new(ErrorCode::StorageError, "Saving your cart failed")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Startup
// =============================================================================

/// Errors that stop the shell from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open local storage: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to create catalog client: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_map_to_fetch_error() {
        let api: ApiError = CatalogError::Status {
            url: "https://fakestoreapi.com/products".into(),
            status: 503,
        }
        .into();
        assert_eq!(api.code, ErrorCode::FetchError);
        assert!(api.retryable);

        let api: ApiError = CatalogError::Decode {
            url: "https://fakestoreapi.com/products".into(),
            reason: "expected value".into(),
        }
        .into();
        assert_eq!(api.code, ErrorCode::FetchError);
        assert!(!api.retryable);
    }

    #[test]
    fn test_not_found() {
        let api: ApiError = CatalogError::NotFound(42).into();
        assert_eq!(api.code, ErrorCode::NotFound);
        assert_eq!(api.message, "Product not found: 42");

        let api: ApiError = CoreError::ProductNotFound(7).into();
        assert_eq!(api.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let api = ApiError::new(ErrorCode::FetchError, "offline").retryable(true);
        assert_eq!(
            serde_json::to_value(&api).unwrap(),
            serde_json::json!({ "code": "FETCH_ERROR", "message": "offline", "retryable": true })
        );
    }
}
