//! User Types
//!
//! Profile records and the request/response bodies of the credential endpoints.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Role tag carried on a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }
}

/// User profile as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    /// Avatar URL or asset reference.
    #[serde(default)]
    pub avatar: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// `POST /auth/login` body.
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }
}

/// `POST /auth/register` body.
#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub email: String,
    pub nickname: String,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            email: email.into(),
            nickname: nickname.into(),
        }
    }
}

/// Response of the login and register endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Profile,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Outcome of a store-level credential operation.
///
/// Expected failures (wrong password, taken username, network down) are
/// values, not errors.
#[derive(Clone, Debug)]
pub enum AuthOutcome {
    Success { data: AuthResponse },
    Failure { error: String },
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&AuthResponse> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<AuthResponse, String> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { error } => Err(error),
        }
    }
}
