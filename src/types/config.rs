//! Configuration Types
//!
//! Backend, provider and route configuration for the login flow.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::builders::AuthConfigBuilder;
use crate::error::AuthError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default path of the provider's authorization page.
pub const DEFAULT_CONNECT_PATH: &str = "/new/connect/";
/// Default durable key for the bearer token.
pub const DEFAULT_TOKEN_KEY: &str = "token";
/// Default login route.
pub const DEFAULT_LOGIN_ROUTE: &str = "/auth";
/// Default home route.
pub const DEFAULT_HOME_ROUTE: &str = "/";

/// Authentication subsystem configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Backend API base URL, without trailing slash.
    pub backend_base_url: String,
    /// Authorization server settings.
    pub provider: ProviderConfig,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Durable key holding the bearer token.
    pub token_storage_key: String,
    /// Application routes used for navigation.
    pub routes: RouteConfig,
}

impl AuthConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `COURSERATE_BACKEND_BASE_URL` (required)
    /// - `COURSERATE_OAUTH2_BASE_URL` (required)
    /// - `COURSERATE_OAUTH2_APP_ID` (required)
    /// - `COURSERATE_OAUTH2_REDIRECT_URI` (required)
    /// - `COURSERATE_OAUTH2_SCOPE` (optional)
    /// - `COURSERATE_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let mut builder = AuthConfigBuilder::new();

        if let Some(url) = lookup("COURSERATE_BACKEND_BASE_URL") {
            builder = builder.backend_base_url(url);
        }
        if let Some(url) = lookup("COURSERATE_OAUTH2_BASE_URL") {
            builder = builder.provider_base_url(url);
        }
        if let Some(app_id) = lookup("COURSERATE_OAUTH2_APP_ID") {
            builder = builder.app_id(app_id);
        }
        if let Some(uri) = lookup("COURSERATE_OAUTH2_REDIRECT_URI") {
            builder = builder.redirect_uri(uri);
        }
        if let Some(scope) = lookup("COURSERATE_OAUTH2_SCOPE") {
            builder = builder.scope(scope);
        }
        if let Some(timeout_str) = lookup("COURSERATE_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }

    /// Returns the full URL for a backend endpoint.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.backend_base_url, path.trim_start_matches('/'))
    }
}

/// Authorization server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Application identifier registered with the provider.
    pub app_id: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
    /// Requested scope.
    pub scope: String,
    /// Path of the authorization page under `base_url`.
    pub connect_path: String,
}

impl ProviderConfig {
    /// Full URL of the provider's authorization page.
    pub fn connect_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.connect_path.trim_start_matches('/')
        )
    }
}

/// Navigation routes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login: String,
    pub home: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_ROUTE.to_string(),
            home: DEFAULT_HOME_ROUTE.to_string(),
        }
    }
}
