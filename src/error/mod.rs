//! Authentication Error Types
//!
//! Closed error hierarchy for the login flow and session store, plus the
//! classifier that turns any failure into one user-facing message.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Fallback when a structured error body carries no `error` field.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Fallback when a transport failure carries no message.
pub const NETWORK_ERROR: &str = "network error";

/// Description attached to every transport failure.
pub const CHECK_NETWORK: &str = "check network connectivity";

/// Root error type for the authentication subsystem.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "AUTH_VALIDATION",
            Self::Transport(_) => "AUTH_TRANSPORT",
            Self::Protocol(_) => "AUTH_PROTOCOL",
            Self::Configuration(_) => "AUTH_CONFIG",
            Self::Storage(_) => "AUTH_STORAGE",
        }
    }

    /// HTTP status of the backend response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Protocol(ProtocolError::ErrorResponse { status, .. })
            | Self::Protocol(ProtocolError::InvalidResponse { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// True when an authenticated call was rejected with 401.
    pub fn is_auth_expiry(&self) -> bool {
        self.status() == Some(401)
    }

    /// Build a protocol error from a non-success response.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Protocol(ProtocolError::ErrorResponse {
            status,
            body: ApiErrorBody::parse(body),
        })
    }
}

/// Malformed or missing local input. Never leaves the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required OAuth2 parameter: {name}")]
    MissingParameter { name: &'static str },

    #[error("invalid state parameter")]
    InvalidState { state: String },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// The request never reached the backend.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("network error: {message}")]
    ConnectionFailed { message: String },

    #[error("network error: request timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// The backend (or provider) answered, but not with a usable success.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("HTTP {status}: {}", .body.error.as_deref().unwrap_or(UNKNOWN_ERROR))]
    ErrorResponse { status: u16, body: ApiErrorBody },

    #[error("invalid response (HTTP {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("authorization denied by provider: {error}")]
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
}

/// Configuration error.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid endpoint URL {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Token persistence error.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Structured error body returned by the backend.
///
/// Parsing is lenient: a body that is not a JSON object yields empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Parse error body from HTTP response text.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Which side of the wire a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached the client.
    Transport,
    /// A response arrived carrying an error.
    Protocol,
    /// Local input was rejected before any request.
    Validation,
}

/// Normalized failure used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub error: String,
    pub description: Option<String>,
    pub code: Option<u16>,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_error_message(self))
    }
}

/// Normalize any authentication failure.
pub fn classify(error: &AuthError) -> ClassifiedError {
    match error {
        AuthError::Protocol(ProtocolError::ErrorResponse { status, body }) => ClassifiedError {
            kind: ErrorKind::Protocol,
            error: body
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            description: body.message.clone().filter(|m| !m.is_empty()),
            code: Some(*status),
        },
        AuthError::Protocol(ProtocolError::InvalidResponse { status, message }) => {
            ClassifiedError {
                kind: ErrorKind::Protocol,
                error: "invalid response".to_string(),
                description: Some(message.clone()),
                code: Some(*status),
            }
        }
        AuthError::Protocol(ProtocolError::ProviderDenied { error, description }) => {
            ClassifiedError {
                kind: ErrorKind::Protocol,
                error: error.clone(),
                description: description.clone(),
                code: None,
            }
        }
        AuthError::Transport(transport) => {
            let error = match transport {
                TransportError::ConnectionFailed { message } if message.is_empty() => {
                    NETWORK_ERROR.to_string()
                }
                other => other.to_string(),
            };
            ClassifiedError {
                kind: ErrorKind::Transport,
                error,
                description: Some(CHECK_NETWORK.to_string()),
                code: None,
            }
        }
        AuthError::Validation(_) | AuthError::Configuration(_) | AuthError::Storage(_) => {
            ClassifiedError {
                kind: ErrorKind::Validation,
                error: error.to_string(),
                description: None,
                code: None,
            }
        }
    }
}

/// Render a classified error as `error[: description][ (error code: N)]`.
pub fn format_error_message(error: &ClassifiedError) -> String {
    let mut message = error.error.clone();

    if let Some(description) = error.description.as_deref().filter(|d| !d.is_empty()) {
        message.push_str(": ");
        message.push_str(description);
    }

    if let Some(code) = error.code {
        message.push_str(&format!(" (error code: {})", code));
    }

    message
}

/// Classify and format in one step.
pub fn user_message(error: &AuthError) -> String {
    format_error_message(&classify(error))
}
