//! Catalog client settings. This is the `[catalog]` section of the app
//! configuration file.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{CatalogError, CatalogResult};

/// Public demo catalog the screens were built against.
pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";

/// Settings for [`crate::CatalogClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root of the catalog API, without the `/products` path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("storefront/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl CatalogConfig {
    /// Default settings pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        CatalogConfig {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses `base_url`, which must be an absolute http(s) URL.
    pub fn parsed_base_url(&self) -> CatalogResult<Url> {
        let invalid = |reason: String| CatalogError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };

        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }
        Ok(url)
    }

    /// Checks the settings without building a client.
    pub fn validate(&self) -> CatalogResult<()> {
        self.parsed_base_url()?;
        if self.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url, "https://fakestoreapi.com");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("storefront/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(CatalogConfig::with_base_url("ftp://example.com")
            .validate()
            .is_err());
        assert!(CatalogConfig::with_base_url("not a url").validate().is_err());
        assert!(CatalogConfig::with_base_url("http://127.0.0.1:8080/api")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = CatalogConfig {
            timeout_secs: 0,
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
