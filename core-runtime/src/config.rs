//! # Core Configuration Module
//!
//! Provides configuration management for the rmobility client core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the API base URL, endpoint paths, storage key names,
//! and HTTP timing settings used by the session and API layers. It enforces
//! fail-fast validation so a malformed base URL is caught at startup instead
//! of on the first request.
//!
//! ## Usage
//!
//! ### Basic Configuration
//!
//! ```
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.rmobility.example/api/v1")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ### Environment Override
//!
//! The `RMOBILITY_API_URL` environment variable, when set, takes precedence
//! over the base URL passed to the builder. This mirrors how deployments
//! point staging consoles at a different backend without a rebuild.

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV_VAR: &str = "RMOBILITY_API_URL";

/// Default request timeout for API calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Storage key names for the persisted session.
///
/// The three keys are written and read independently; the session layer
/// treats each as its own source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key under which the access token is persisted.
    pub access_token: String,
    /// Key under which the refresh token is persisted.
    pub refresh_token: String,
    /// Key under which the serialized user object is persisted.
    pub current_user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            access_token: "access_token".to_string(),
            refresh_token: "refresh_token".to_string(),
            current_user: "current_user".to_string(),
        }
    }
}

/// API endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    pub login: String,
    pub register: String,
    pub refresh_token: String,
    pub verify_phone: String,
    pub upload_verification: String,
    pub transport_items: String,
    pub transport_podiums: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            login: "auth/login".to_string(),
            register: "auth/register".to_string(),
            refresh_token: "auth/refresh-token".to_string(),
            verify_phone: "auth/verify-phone".to_string(),
            upload_verification: "auth/upload-verification".to_string(),
            transport_items: "transport-items".to_string(),
            transport_podiums: "transport-podiums".to_string(),
        }
    }
}

/// Core configuration for the rmobility client.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Base URL all endpoint paths are joined against.
    pub api_base_url: Url,

    /// Endpoint paths relative to `api_base_url`.
    pub endpoints: EndpointPaths,

    /// Storage key names for persisted session material.
    pub storage_keys: StorageKeys,

    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Resolves an endpoint path against the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        // Url::join treats a base without a trailing slash as a file; the
        // last path segment would be dropped. Normalize before joining.
        let base = if self.api_base_url.path().ends_with('/') {
            self.api_base_url.clone()
        } else {
            let mut base = self.api_base_url.clone();
            base.set_path(&format!("{}/", base.path()));
            base
        };

        base.join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    /// Paths on which a 401 response must never trigger a token refresh.
    ///
    /// These are the endpoints that establish or repair a session; replaying
    /// them after a refresh would loop.
    pub fn refresh_exempt_paths(&self) -> [&str; 5] {
        [
            &self.endpoints.login,
            &self.endpoints.register,
            &self.endpoints.refresh_token,
            &self.endpoints.verify_phone,
            &self.endpoints.upload_verification,
        ]
    }

    /// Returns true when the given request URL targets a refresh-exempt path.
    pub fn is_refresh_exempt(&self, request_url: &str) -> bool {
        self.refresh_exempt_paths()
            .iter()
            .any(|path| request_url.contains(*path))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                self.api_base_url.scheme()
            )));
        }

        if self.http_timeout.is_zero() {
            return Err(Error::Config(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }

        let keys = &self.storage_keys;
        if keys.access_token.is_empty() || keys.refresh_token.is_empty() || keys.current_user.is_empty()
        {
            return Err(Error::Config(
                "Storage key names cannot be empty".to_string(),
            ));
        }

        if keys.access_token == keys.refresh_token
            || keys.access_token == keys.current_user
            || keys.refresh_token == keys.current_user
        {
            return Err(Error::Config(
                "Storage key names must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// The builder validates the base URL and key names and provides actionable
/// error messages when something is missing or malformed.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    endpoints: Option<EndpointPaths>,
    storage_keys: Option<StorageKeys>,
    http_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    /// Sets the API base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .api_base_url("https://api.rmobility.example/api/v1");
    /// ```
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the default endpoint paths.
    pub fn endpoints(mut self, endpoints: EndpointPaths) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Overrides the default storage key names.
    pub fn storage_keys(mut self, keys: StorageKeys) -> Self {
        self.storage_keys = Some(keys);
        self
    }

    /// Sets the per-request HTTP timeout.
    ///
    /// Default: 30 seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// The `RMOBILITY_API_URL` environment variable, when set and non-empty,
    /// takes precedence over the builder's base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No base URL was provided (builder or environment)
    /// - The base URL does not parse or is not http(s)
    /// - Storage key names are empty or collide
    pub fn build(self) -> Result<CoreConfig> {
        let raw_url = match std::env::var(API_URL_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => self.api_base_url.ok_or_else(|| {
                Error::Config(
                    "API base URL is required. Use .api_base_url() to set it or \
                     export RMOBILITY_API_URL."
                        .to_string(),
                )
            })?,
        };

        let api_base_url = Url::parse(&raw_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw_url, e)))?;

        let config = CoreConfig {
            api_base_url,
            endpoints: self.endpoints.unwrap_or_default(),
            storage_keys: self.storage_keys.unwrap_or_default(),
            http_timeout: self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CoreConfig {
        CoreConfig::builder()
            .api_base_url("https://api.rmobility.example/api/v1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = CoreConfig::builder().build();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API base URL is required"));
    }

    #[test]
    fn test_builder_rejects_malformed_url() {
        let result = CoreConfig::builder().api_base_url("not a url").build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid API base URL"));
    }

    #[test]
    fn test_builder_rejects_non_http_scheme() {
        let result = CoreConfig::builder()
            .api_base_url("ftp://api.rmobility.example")
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn test_default_storage_keys() {
        let config = base_config();
        assert_eq!(config.storage_keys.access_token, "access_token");
        assert_eq!(config.storage_keys.refresh_token, "refresh_token");
        assert_eq!(config.storage_keys.current_user, "current_user");
    }

    #[test]
    fn test_storage_keys_must_be_distinct() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.rmobility.example")
            .storage_keys(StorageKeys {
                access_token: "token".to_string(),
                refresh_token: "token".to_string(),
                current_user: "current_user".to_string(),
            })
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("distinct"));
    }

    #[test]
    fn test_endpoint_url_joins_against_base() {
        let config = base_config();
        let url = config.endpoint_url("auth/login").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.rmobility.example/api/v1/auth/login"
        );
    }

    #[test]
    fn test_endpoint_url_handles_trailing_slash() {
        let config = CoreConfig::builder()
            .api_base_url("https://api.rmobility.example/api/v1/")
            .build()
            .unwrap();
        let url = config.endpoint_url("/transport-items").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.rmobility.example/api/v1/transport-items"
        );
    }

    #[test]
    fn test_refresh_exempt_paths() {
        let config = base_config();
        let exempt = config.refresh_exempt_paths();
        assert!(exempt.contains(&"auth/login"));
        assert!(exempt.contains(&"auth/refresh-token"));
        assert!(exempt.contains(&"auth/upload-verification"));
        assert_eq!(exempt.len(), 5);
    }

    #[test]
    fn test_is_refresh_exempt() {
        let config = base_config();
        assert!(config.is_refresh_exempt("https://api.rmobility.example/api/v1/auth/login"));
        assert!(config.is_refresh_exempt("https://api.rmobility.example/api/v1/auth/verify-phone"));
        assert!(!config.is_refresh_exempt("https://api.rmobility.example/api/v1/transport-items"));
    }

    #[test]
    fn test_default_timeout() {
        let config = base_config();
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn test_custom_timeout() {
        let config = CoreConfig::builder()
            .api_base_url("https://api.rmobility.example")
            .http_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.rmobility.example")
            .http_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = base_config();
        let cloned = config.clone();
        assert_eq!(cloned, config);
    }
}
