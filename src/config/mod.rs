//! Configuration for the Netatmo client.

use std::time::Duration;

use url::Url;

use crate::errors::{NetatmoError, NetatmoResult};
use crate::resilience::RetryConfig;

/// Where the access token rides on authenticated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPlacement {
    /// `access_token` form field in the POST body (the vendor's convention)
    #[default]
    Body,
    /// `access_token` query parameter
    Query,
    /// `Authorization: Bearer` request header
    Header,
}

/// Configuration for the Netatmo client
#[derive(Debug, Clone)]
pub struct NetatmoConfig {
    /// Base URL for API requests; always ends with a slash so endpoint paths
    /// join underneath it
    pub base_url: Url,
    /// Per-request timeout, covering connection plus body
    pub request_timeout: Duration,
    /// Retry budgets and backoff shape for transient failures
    pub retry: RetryConfig,
    /// Where the access token is attached
    pub token_placement: TokenPlacement,
    /// OAuth scope requested by the password grant
    pub scope: String,
    /// Form field name of the vendor's user-prefix extension
    pub user_prefix_field: String,
    /// Form field name of the vendor's app-version extension
    pub app_version_field: String,
}

impl Default for NetatmoConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(crate::DEFAULT_BASE_URL).unwrap(),
            request_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
            token_placement: TokenPlacement::default(),
            scope: crate::DEFAULT_SCOPE.to_string(),
            user_prefix_field: "user_prefix".to_string(),
            app_version_field: "app_version".to_string(),
        }
    }
}

impl NetatmoConfig {
    /// Create a new configuration builder
    pub fn builder() -> NetatmoConfigBuilder {
        NetatmoConfigBuilder::new()
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint_url(&self, path: &str) -> NetatmoResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                NetatmoError::invalid_argument(format!("invalid endpoint path {path:?}: {e}"))
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> NetatmoResult<()> {
        if !self.base_url.path().ends_with('/') {
            return Err(NetatmoError::invalid_argument(
                "base_url must end with a slash",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(NetatmoError::invalid_argument(
                "request_timeout must be non-zero",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(NetatmoError::invalid_argument(
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.scope.is_empty() {
            return Err(NetatmoError::invalid_argument("scope must not be empty"));
        }
        if self.user_prefix_field.is_empty() || self.app_version_field.is_empty() {
            return Err(NetatmoError::invalid_argument(
                "vendor extension field names must not be empty",
            ));
        }
        Ok(())
    }
}

/// Builder for [`NetatmoConfig`]
#[derive(Debug, Default)]
pub struct NetatmoConfigBuilder {
    config: NetatmoConfig,
}

impl NetatmoConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: NetatmoConfig::default(),
        }
    }

    /// Set the base URL. A missing trailing slash is added so endpoint paths
    /// resolve under the URL instead of replacing its last segment.
    pub fn base_url(mut self, url: &str) -> NetatmoResult<Self> {
        let mut parsed = Url::parse(url)
            .map_err(|e| NetatmoError::invalid_argument(format!("invalid base URL: {e}")))?;
        if !parsed.path().ends_with('/') {
            parsed.set_path(&format!("{}/", parsed.path()));
        }
        self.config.base_url = parsed;
        Ok(self)
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the retry configuration
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set where the access token is attached
    pub fn token_placement(mut self, placement: TokenPlacement) -> Self {
        self.config.token_placement = placement;
        self
    }

    /// Set the OAuth scope requested by the password grant
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.config.scope = scope.into();
        self
    }

    /// Rename the vendor extension fields sent with the password grant
    pub fn vendor_extension_fields(
        mut self,
        user_prefix_field: impl Into<String>,
        app_version_field: impl Into<String>,
    ) -> Self {
        self.config.user_prefix_field = user_prefix_field.into();
        self.config.app_version_field = app_version_field.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> NetatmoResult<NetatmoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the configuration without validation (for testing)
    pub fn build_unchecked(self) -> NetatmoConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_production_api() {
        let config = NetatmoConfig::default();
        assert_eq!(config.base_url.as_str(), "https://api.netatmo.com/");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.scope, "read_thermostat write_thermostat");
        assert_eq!(config.token_placement, TokenPlacement::Body);
        assert_eq!(config.user_prefix_field, "user_prefix");
        assert_eq!(config.app_version_field, "app_version");
    }

    #[test]
    fn builder_normalizes_the_base_url_to_a_trailing_slash() {
        let config = NetatmoConfig::builder()
            .base_url("https://example.com/proxy")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.base_url.as_str(), "https://example.com/proxy/");
    }

    #[test]
    fn endpoint_url_joins_under_the_base() {
        let config = NetatmoConfig::builder()
            .base_url("https://example.com/proxy")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            config.endpoint_url("api/getthermostatsdata").unwrap().as_str(),
            "https://example.com/proxy/api/getthermostatsdata"
        );
        assert_eq!(
            config.endpoint_url("/oauth2/token").unwrap().as_str(),
            "https://example.com/proxy/oauth2/token"
        );
    }

    #[test]
    fn builder_rejects_unparseable_urls() {
        assert!(NetatmoConfig::builder().base_url("not a url").is_err());
    }

    #[test]
    fn validation_rejects_empty_budgets_and_names() {
        let zero_timeout = NetatmoConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(zero_timeout.is_err());

        let zero_attempts = NetatmoConfig::builder()
            .retry(RetryConfig::new().max_attempts(0))
            .build();
        assert!(zero_attempts.is_err());

        let empty_scope = NetatmoConfig::builder().scope("").build();
        assert!(empty_scope.is_err());

        let empty_extension = NetatmoConfig::builder()
            .vendor_extension_fields("", "app_version")
            .build();
        assert!(empty_extension.is_err());
    }

    #[test]
    fn build_unchecked_skips_validation() {
        let config = NetatmoConfig::builder()
            .request_timeout(Duration::ZERO)
            .build_unchecked();
        assert!(config.request_timeout.is_zero());
    }
}
