//! Configuration Builder
//!
//! Fluent builder for the authentication configuration.

use std::time::Duration;
use url::Url;

use crate::error::{AuthError, ConfigurationError};
use crate::types::{
    AuthConfig, ProviderConfig, RouteConfig, DEFAULT_CONNECT_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TOKEN_KEY,
};

/// Authentication configuration builder.
#[derive(Default)]
pub struct AuthConfigBuilder {
    backend_base_url: Option<String>,
    provider_base_url: Option<String>,
    app_id: Option<String>,
    redirect_uri: Option<String>,
    scope: Option<String>,
    connect_path: Option<String>,
    token_storage_key: Option<String>,
    login_route: Option<String>,
    home_route: Option<String>,
    timeout: Option<Duration>,
}

impl AuthConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend API base URL.
    pub fn backend_base_url(mut self, url: impl Into<String>) -> Self {
        self.backend_base_url = Some(url.into());
        self
    }

    /// Set provider base URL.
    pub fn provider_base_url(mut self, url: impl Into<String>) -> Self {
        self.provider_base_url = Some(url.into());
        self
    }

    /// Set provider application ID.
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Set callback URL registered with the provider.
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Override the provider authorization page path.
    pub fn connect_path(mut self, path: impl Into<String>) -> Self {
        self.connect_path = Some(path.into());
        self
    }

    /// Override the durable token key.
    pub fn token_storage_key(mut self, key: impl Into<String>) -> Self {
        self.token_storage_key = Some(key.into());
        self
    }

    /// Override the login route.
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = Some(route.into());
        self
    }

    /// Override the home route.
    pub fn home_route(mut self, route: impl Into<String>) -> Self {
        self.home_route = Some(route.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn required(value: Option<String>, field: &str) -> Result<String, AuthError> {
        value.filter(|v| !v.is_empty()).ok_or_else(|| {
            AuthError::Configuration(ConfigurationError::MissingField {
                field: field.to_string(),
            })
        })
    }

    fn absolute_url(value: String) -> Result<String, AuthError> {
        Url::parse(&value).map_err(|e| {
            AuthError::Configuration(ConfigurationError::InvalidEndpoint {
                url: value.clone(),
                message: e.to_string(),
            })
        })?;
        Ok(value)
    }

    /// Build the configuration.
    pub fn build(self) -> Result<AuthConfig, AuthError> {
        let backend_base_url =
            Self::absolute_url(Self::required(self.backend_base_url, "backend_base_url")?)?;
        let provider_base_url =
            Self::absolute_url(Self::required(self.provider_base_url, "provider_base_url")?)?;
        let app_id = Self::required(self.app_id, "app_id")?;
        let redirect_uri = Self::absolute_url(Self::required(self.redirect_uri, "redirect_uri")?)?;

        let defaults = RouteConfig::default();

        Ok(AuthConfig {
            backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
            provider: ProviderConfig {
                base_url: provider_base_url,
                app_id,
                redirect_uri,
                scope: self.scope.unwrap_or_default(),
                connect_path: self
                    .connect_path
                    .unwrap_or_else(|| DEFAULT_CONNECT_PATH.to_string()),
            },
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            token_storage_key: self
                .token_storage_key
                .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
            routes: RouteConfig {
                login: self.login_route.unwrap_or(defaults.login),
                home: self.home_route.unwrap_or(defaults.home),
            },
        })
    }
}

/// Create a new configuration builder.
pub fn auth_config() -> AuthConfigBuilder {
    AuthConfigBuilder::new()
}
