//! Integration tests using WireMock
//!
//! These tests drive the flow coordinator and the session store through the
//! reqwest transport against a mock backend.

mod flow;
mod session;

use courserate_auth::{auth_config, AuthConfig};
use serde_json::json;
use wiremock::MockServer;

/// A state value in the accepted shape.
pub const STATE: &str = "5f2b8c0d9e7a41c3b6d0f8e2a1c4b7d9";

/// Helper to create a mock server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration whose backend is `base_url`.
pub fn config_for(base_url: &str) -> AuthConfig {
    auth_config()
        .backend_base_url(base_url)
        .provider_base_url("https://market.example.com")
        .app_id("courserate")
        .redirect_uri("http://localhost:5173/auth/callback")
        .scope("profile")
        .build()
        .expect("valid test configuration")
}

/// Profile body as served by the backend.
pub fn user_json(username: &str, role: &str) -> serde_json::Value {
    json!({
        "id": 11,
        "username": username,
        "email": format!("{}@example.com", username),
        "nickname": username,
        "avatar": "",
        "role": role,
        "createdAt": "2024-09-01T10:00:00Z",
        "updatedAt": "2024-09-01T10:00:00Z"
    })
}
