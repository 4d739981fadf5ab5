//! Session Store
//!
//! Application-wide record of who is signed in, backed by durable token
//! persistence.

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::Instrument;

use crate::core::{CredentialSource, HttpRequest, HttpTransport};
use crate::error::{AuthError, AuthResult, ProtocolError};
use crate::session::guards::AccessControl;
use crate::session::persistence::TokenPersistence;
use crate::telemetry::{record_failure, token_hint, AuthSpanNames};
use crate::types::{AuthConfig, AuthOutcome, AuthResponse, Credentials, Profile, Registration};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const CURRENT_USER_FAILED: &str = "Failed to get user info";

/// Point-in-time view of the session.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Bearer token.
    pub token: Option<SecretString>,
    /// Signed-in user's profile.
    pub user: Option<Profile>,
    /// A store-level request is in flight.
    pub is_loading: bool,
    /// Message of the last failed operation.
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(Profile::is_admin)
    }
}

/// Session store.
///
/// Token and user are always replaced together under one lock, so readers
/// never see a token from one session with the profile of another.
pub struct SessionStore<T: HttpTransport, P: TokenPersistence> {
    config: AuthConfig,
    transport: Arc<T>,
    persistence: Arc<P>,
    state: RwLock<SessionState>,
}

impl<T: HttpTransport, P: TokenPersistence> SessionStore<T, P> {
    /// Create the store, restoring a persisted token if one exists.
    ///
    /// The profile is not restored; call [`Self::get_current_user`] to
    /// fetch it.
    pub fn new(config: AuthConfig, transport: Arc<T>, persistence: Arc<P>) -> Self {
        let token = match persistence.load(&config.token_storage_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token");
                None
            }
        };

        if let Some(token) = &token {
            tracing::debug!(token = %token_hint(token), "restored persisted token");
        }

        Self {
            config,
            transport,
            persistence,
            state: RwLock::new(SessionState {
                token: token.map(SecretString::new),
                ..SessionState::default()
            }),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn persist_token(&self, token: Option<&str>) {
        let key = &self.config.token_storage_key;
        let result = match token {
            Some(token) => self.persistence.save(key, token),
            None => self.persistence.remove(key),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "token persistence failed");
        }
    }

    fn install(&self, state: &mut SessionState, token: Option<&str>) {
        let token = token.filter(|t| !t.is_empty());
        self.persist_token(token);
        state.token = token.map(|t| SecretString::new(t.to_string()));
    }

    /// Replace the token in memory and in persistence.
    ///
    /// Clearing the token leaves the profile in place; the session stops
    /// counting as authenticated either way.
    pub fn set_token(&self, token: Option<&str>) {
        let mut state = self.state.write();
        self.install(&mut state, token);
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
    }

    fn establish(&self, token: &str, user: Profile) {
        let mut state = self.state.write();
        self.install(&mut state, Some(token));
        tracing::info!(user_id = user.id, role = user.role.as_str(), "session established");
        state.user = Some(user);
        state.error = None;
        state.is_loading = false;
    }

    fn fail(&self, operation: &'static str, error: &AuthError, fallback: &str) -> String {
        record_failure(operation, error);
        let message = failure_message(error, fallback);
        let mut state = self.state.write();
        state.error = Some(message.clone());
        state.is_loading = false;
        message
    }

    async fn post_credentials<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AuthResult<AuthResponse> {
        let request = HttpRequest::post_json(self.config.endpoint_url(path), body)?
            .with_timeout(self.config.timeout);
        self.transport.send(request).await?.into_json()
    }

    /// Sign in with username and password.
    pub async fn login(&self, credentials: Credentials) -> AuthOutcome {
        let span = tracing::info_span!(AuthSpanNames::LOGIN, username = %credentials.username);
        async {
            self.begin();
            match self.post_credentials("/auth/login", &credentials).await {
                Ok(data) => {
                    self.establish(&data.token, data.user.clone());
                    AuthOutcome::Success { data }
                }
                Err(e) => AuthOutcome::Failure {
                    error: self.fail(AuthSpanNames::LOGIN, &e, LOGIN_FAILED),
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Create an account and sign in with it.
    pub async fn register(&self, registration: Registration) -> AuthOutcome {
        let span = tracing::info_span!(AuthSpanNames::REGISTER, username = %registration.username);
        async {
            self.begin();
            match self.post_credentials("/auth/register", &registration).await {
                Ok(data) => {
                    self.establish(&data.token, data.user.clone());
                    AuthOutcome::Success { data }
                }
                Err(e) => AuthOutcome::Failure {
                    error: self.fail(AuthSpanNames::REGISTER, &e, REGISTRATION_FAILED),
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Drop the session: token, profile and last error.
    pub fn logout(&self) {
        let mut state = self.state.write();
        self.install(&mut state, None);
        state.user = None;
        state.error = None;
        tracing::info!("session cleared");
    }

    /// Refresh the profile for the current token.
    ///
    /// Returns `Ok(None)` without a request when no token is held. A 401
    /// ends the session before the error is returned.
    pub async fn get_current_user(&self) -> AuthResult<Option<Profile>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        async {
            self.begin();
            let request = HttpRequest::get(self.config.endpoint_url("/auth/me"))
                .with_timeout(self.config.timeout)
                .with_bearer(token.expose_secret());

            let result = match self.transport.send(request).await {
                Ok(response) => response.into_json::<Profile>(),
                Err(e) => Err(e),
            };

            match result {
                Ok(profile) => {
                    let mut state = self.state.write();
                    state.user = Some(profile.clone());
                    state.is_loading = false;
                    Ok(Some(profile))
                }
                Err(e) => {
                    if e.is_auth_expiry() {
                        self.logout();
                    }
                    self.fail(AuthSpanNames::CURRENT_USER, &e, CURRENT_USER_FAILED);
                    Err(e)
                }
            }
        }
        .instrument(tracing::info_span!(AuthSpanNames::CURRENT_USER))
        .await
    }

    /// Install the result of a completed authorization-code exchange.
    pub fn oauth2_login(&self, token: &str, user: Profile) {
        self.establish(token, user);
    }

    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    pub fn token(&self) -> Option<SecretString> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<Profile> {
        self.state.read().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.read().is_admin()
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }
}

/// Backend-supplied `error` field, or `fallback`.
fn failure_message(error: &AuthError, fallback: &str) -> String {
    match error {
        AuthError::Protocol(ProtocolError::ErrorResponse { body, .. }) => body
            .error
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
        _ => fallback.to_string(),
    }
}

impl<T: HttpTransport, P: TokenPersistence> CredentialSource for SessionStore<T, P> {
    fn bearer_token(&self) -> Option<String> {
        self.state
            .read()
            .token
            .as_ref()
            .map(|t| t.expose_secret().clone())
    }

    fn on_unauthorized(&self) {
        self.logout();
    }
}

impl<T: HttpTransport, P: TokenPersistence> AccessControl for SessionStore<T, P> {
    fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    fn is_admin(&self) -> bool {
        self.state.read().is_admin()
    }
}
