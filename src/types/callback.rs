//! Callback Types
//!
//! Types exchanged around the authorization redirect and code exchange.

use serde::{Deserialize, Serialize};
use url::Url;

use super::user::Profile;

/// The `code`/`state` pair carried by a provider callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthParams {
    /// Authorization code.
    pub code: String,
    /// State parameter.
    pub state: String,
}

/// Every authorization-related parameter found on a callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code (if success).
    pub code: Option<String>,
    /// State parameter.
    pub state: Option<String>,
    /// Error code (if authorization failed at the provider).
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse callback parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }

    /// Check if callback contains a provider error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The code/state pair, if both are present.
    pub fn auth_params(&self) -> Option<AuthParams> {
        Some(AuthParams {
            code: self.code.clone()?,
            state: self.state.clone()?,
        })
    }
}

/// `GET /auth/oauth2/state` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: String,
}

/// `GET /auth/oauth2/callback` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub token: String,
    pub user: Profile,
    #[serde(default)]
    pub message: String,
}

/// Session material produced by a successful code exchange.
#[derive(Clone)]
pub struct SessionGrant {
    pub token: String,
    pub user: Profile,
}

impl std::fmt::Debug for SessionGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGrant")
            .field("token", &"[REDACTED]")
            .field("user", &self.user.username)
            .finish()
    }
}

impl From<CallbackResponse> for SessionGrant {
    fn from(response: CallbackResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}
