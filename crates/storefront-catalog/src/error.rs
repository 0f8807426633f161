//! # Catalog Errors
//!
//! Every way a catalog request can fail, and whether retrying can help.

use thiserror::Error;

/// Errors from the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configured base URL is not a usable http(s) URL.
    #[error("Invalid catalog URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A setting other than the URL is out of range.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection refused, DNS failure, reset, etc.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The catalog answered with a non-2xx status.
    #[error("Catalog returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON shape expected.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The record decoded but failed validation.
    #[error("Invalid product record {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },

    /// The catalog has no product with this id (it answers with an empty body).
    #[error("Product {0} not found")]
    NotFound(i64),
}

impl CatalogError {
    /// True if the same request might succeed later.
    ///
    /// ```text
    /// Transport, Timeout          → retryable
    /// Status 408 / 429 / 5xx      → retryable
    /// everything else             → not retryable
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Transport { .. } | CatalogError::Timeout { .. } => true,
            CatalogError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> CatalogError {
        CatalogError::Status {
            url: "https://fakestoreapi.com/products".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(400).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(CatalogError::Timeout {
            url: "u".into(),
            secs: 10
        }
        .is_retryable());
        assert!(!CatalogError::NotFound(99).is_retryable());
        assert!(!CatalogError::Decode {
            url: "u".into(),
            reason: "eof".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            status(500).to_string(),
            "Catalog returned HTTP 500 for https://fakestoreapi.com/products"
        );
    }
}
