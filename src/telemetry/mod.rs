//! Telemetry
//!
//! Span names, field names and logging helpers for authentication events.
//! Events go through `tracing`; tokens and passwords are never recorded.

use crate::error::{classify, AuthError};

/// Span names for authentication operations.
pub struct AuthSpanNames;

impl AuthSpanNames {
    pub const START_LOGIN: &'static str = "courserate_auth.start_login";
    pub const HANDLE_CALLBACK: &'static str = "courserate_auth.handle_callback";
    pub const COMPLETE_LOGIN: &'static str = "courserate_auth.complete_login";
    pub const LOGIN: &'static str = "courserate_auth.login";
    pub const REGISTER: &'static str = "courserate_auth.register";
    pub const CURRENT_USER: &'static str = "courserate_auth.current_user";
}

/// Short, non-reversible hint of a token for log correlation.
pub fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}*** ({} chars)", prefix, token.chars().count())
}

/// Emit a warning for a failed operation.
pub fn record_failure(operation: &'static str, error: &AuthError) {
    let classified = classify(error);
    tracing::warn!(
        operation,
        error_code = error.error_code(),
        error_kind = ?classified.kind,
        status = ?classified.code,
        "{}",
        classified
    );
}
