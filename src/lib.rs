//! CourseRate Authentication
//!
//! Client-side authentication for the CourseRate course-rating platform:
//! username/password login against the backend and single sign-on through
//! the platform's OAuth2 provider.
//!
//! # Features
//!
//! - Authorization Code login with backend-issued `state`
//! - Callback URL parameter handling (detect, extract, strip)
//! - Session store with durable token persistence
//! - Per-request bearer credentials with teardown on 401
//! - Route guards for authenticated and admin-only routes
//! - Error classification into user-facing messages
//!
//! # Example
//!
//! ```rust,ignore
//! use courserate_auth::{auth_client, auth_config, RecordingNavigator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = auth_config()
//!         .backend_base_url("http://localhost:8080/api/v1")
//!         .provider_base_url("https://market.example.com")
//!         .app_id("courserate")
//!         .redirect_uri("http://localhost:5173/auth/callback")
//!         .scope("profile")
//!         .build()?;
//!
//!     let client = auth_client(config, RecordingNavigator::new(), "/var/lib/courserate")?;
//!
//!     // Leaves for the provider's authorization page.
//!     let url = client.start_login().await?;
//!     println!("Authorize at: {}", url);
//!
//!     // Later, when the provider redirects back:
//!     let user = client
//!         .complete_login("http://localhost:5173/auth/callback?code=...&state=...")
//!         .await?;
//!     println!("Signed in as {}", user.username);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: profiles, request/response bodies and configuration
//! - `error`: error hierarchy and classification into display messages
//! - `core`: HTTP transport, navigation, callback parameters, state checks
//! - `flows`: Authorization Code flow coordinator
//! - `session`: session store, token persistence and route guards
//! - `builders`: fluent configuration builder
//! - `client`: high-level client wiring the pieces together

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod session;
pub mod telemetry;
pub mod types;

// Re-export main client
pub use client::{auth_client, ApiTransport, AuthClient};

// Re-export builders
pub use builders::{auth_config, AuthConfigBuilder};

// Re-export core
pub use crate::core::{
    clean_auth_params, clean_auth_params_str, extract_auth_params, extract_auth_params_str,
    generate_state, has_auth_params, has_auth_params_str, login_failure_route, validate_state,
    BearerAuthTransport, CredentialSource, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    MockHttpTransport, NavigationTarget, Navigator, RecordingNavigator, ReqwestHttpTransport,
};

// Re-export errors
pub use error::{
    classify, format_error_message, user_message, ApiErrorBody, AuthError, AuthResult,
    ClassifiedError, ConfigurationError, ErrorKind, ProtocolError, StorageError, TransportError,
    ValidationError,
};

// Re-export flows
pub use flows::{AuthorizationFlow, AuthorizationFlowCoordinator, FlowPhase, FlowStatus};

// Re-export session
pub use session::{
    redirect_if_authenticated, require_admin, require_auth, AccessControl, FileTokenPersistence,
    GuardDecision, InMemoryTokenPersistence, MockTokenPersistence, SessionState, SessionStore,
    TokenPersistence,
};

// Re-export types
pub use types::{
    AuthConfig, AuthOutcome, AuthParams, AuthResponse, CallbackParams, Credentials, Profile,
    ProviderConfig, Registration, Role, RouteConfig, SessionGrant,
};
