//! Authorization Code Flow
//!
//! Browser-redirect login against the course platform's authorization
//! server. The backend issues the `state` value and performs the code
//! exchange; this side only carries values between the two redirects.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::Instrument;
use url::Url;

use crate::core::{
    ensure_valid_state, login_failure_route, parse_url, HttpRequest, HttpTransport, Navigator,
};
use crate::error::{
    user_message, AuthError, AuthResult, ConfigurationError, ProtocolError, ValidationError,
};
use crate::session::{SessionStore, TokenPersistence};
use crate::telemetry::{record_failure, AuthSpanNames};
use crate::types::{
    AuthConfig, AuthParams, CallbackParams, CallbackResponse, Profile, SessionGrant, StateResponse,
};

const STATE_PATH: &str = "/auth/oauth2/state";
const CALLBACK_PATH: &str = "/auth/oauth2/callback";

/// Where an authorization attempt currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowPhase {
    #[default]
    Idle,
    FetchingState,
    Redirecting,
    Exchanging,
    Completed,
    Failed,
}

/// Observable flow status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowStatus {
    pub phase: FlowPhase,
    pub is_loading: bool,
    /// Formatted message of the last failure.
    pub error: Option<String>,
}

/// Authorization Code Flow interface.
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    /// Fetch a state value and leave for the provider's authorization page.
    ///
    /// Returns the URL navigated to.
    async fn start_login(&self) -> AuthResult<String>;

    /// Exchange the callback's code and state for a session grant.
    async fn handle_callback(&self, code: &str, state: &str) -> AuthResult<SessionGrant>;
}

/// Authorization Code Flow coordinator.
///
/// `is_loading` is a status flag only; overlapping attempts are not
/// serialized.
pub struct AuthorizationFlowCoordinator<T: HttpTransport, N: Navigator> {
    config: AuthConfig,
    transport: Arc<T>,
    navigator: Arc<N>,
    status: RwLock<FlowStatus>,
}

impl<T: HttpTransport, N: Navigator> AuthorizationFlowCoordinator<T, N> {
    /// Create new coordinator.
    pub fn new(config: AuthConfig, transport: Arc<T>, navigator: Arc<N>) -> Self {
        Self {
            config,
            transport,
            navigator,
            status: RwLock::new(FlowStatus::default()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.status.read().error.clone()
    }

    pub fn phase(&self) -> FlowPhase {
        self.status.read().phase
    }

    pub fn status(&self) -> FlowStatus {
        self.status.read().clone()
    }

    pub fn clear_error(&self) {
        self.status.write().error = None;
    }

    /// True if `url` carries both `code` and `state`.
    pub fn check_auth_params(&self, url: &str) -> bool {
        crate::core::has_auth_params_str(url)
    }

    /// The `code`/`state` pair of `url`, if both are present.
    pub fn extract_auth_params(&self, url: &str) -> AuthResult<Option<AuthParams>> {
        crate::core::extract_auth_params_str(url)
    }

    fn begin(&self, phase: FlowPhase) {
        let mut status = self.status.write();
        if status.is_loading {
            tracing::debug!(previous = ?status.phase, "authorization attempt overlaps one in flight");
        }
        status.phase = phase;
        status.is_loading = true;
        status.error = None;
    }

    fn finish(&self, phase: FlowPhase) {
        let mut status = self.status.write();
        status.phase = phase;
        status.is_loading = false;
    }

    fn fail(&self, operation: &'static str, error: &AuthError) {
        record_failure(operation, error);
        let mut status = self.status.write();
        status.phase = FlowPhase::Failed;
        status.is_loading = false;
        status.error = Some(user_message(error));
    }

    /// Ask the backend for a fresh state value.
    pub async fn fetch_state(&self) -> AuthResult<String> {
        let request =
            HttpRequest::get(self.config.endpoint_url(STATE_PATH)).with_timeout(self.config.timeout);
        let response: StateResponse = self.transport.send(request).await?.into_json()?;
        ensure_valid_state(&response.state)?;
        Ok(response.state)
    }

    /// Provider authorization URL carrying `state`.
    pub fn authorization_url(&self, state: &str) -> AuthResult<String> {
        let provider = &self.config.provider;
        let endpoint = provider.connect_endpoint();

        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("appid", provider.app_id.as_str()),
                ("redirect_uri", provider.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", provider.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| {
            AuthError::Configuration(ConfigurationError::InvalidEndpoint {
                url: endpoint.clone(),
                message: e.to_string(),
            })
        })?;

        Ok(url.into())
    }

    async fn exchange(&self, code: &str, state: &str) -> AuthResult<SessionGrant> {
        let endpoint = self.config.endpoint_url(CALLBACK_PATH);
        let url = Url::parse_with_params(&endpoint, &[("code", code), ("state", state)])
            .map_err(|e| {
                AuthError::Configuration(ConfigurationError::InvalidEndpoint {
                    url: endpoint.clone(),
                    message: e.to_string(),
                })
            })?;

        let request = HttpRequest::get(url.as_str()).with_timeout(self.config.timeout);
        let response: CallbackResponse = self.transport.send(request).await?.into_json()?;
        if !response.message.is_empty() {
            tracing::debug!(message = %response.message, "callback accepted");
        }
        Ok(response.into())
    }

    fn validate_callback(code: &str, state: &str) -> AuthResult<()> {
        if code.is_empty() {
            return Err(AuthError::Validation(ValidationError::MissingParameter {
                name: "code",
            }));
        }
        if state.is_empty() {
            return Err(AuthError::Validation(ValidationError::MissingParameter {
                name: "state",
            }));
        }
        ensure_valid_state(state)
    }

    async fn resolve_callback(&self, callback_url: &str) -> AuthResult<SessionGrant> {
        let params = match parse_url(callback_url) {
            Ok(url) => CallbackParams::from_url(&url),
            Err(e) => {
                self.fail(AuthSpanNames::COMPLETE_LOGIN, &e);
                return Err(e);
            }
        };

        if let Some(error) = params.error {
            let e = AuthError::Protocol(ProtocolError::ProviderDenied {
                error,
                description: params.error_description,
            });
            self.fail(AuthSpanNames::COMPLETE_LOGIN, &e);
            return Err(e);
        }

        self.handle_callback(
            params.code.as_deref().unwrap_or_default(),
            params.state.as_deref().unwrap_or_default(),
        )
        .await
    }

    /// Finish a login from the provider's callback URL.
    ///
    /// On success the session is established and the home route pushed. On
    /// any failure the login route is pushed with `error=oauth2_failed`.
    pub async fn complete_login<S: HttpTransport, P: TokenPersistence>(
        &self,
        callback_url: &str,
        session: &SessionStore<S, P>,
    ) -> AuthResult<Profile> {
        async {
            match self.resolve_callback(callback_url).await {
                Ok(grant) => {
                    let user = grant.user.clone();
                    session.oauth2_login(&grant.token, grant.user);
                    self.navigator.push(&self.config.routes.home);
                    Ok(user)
                }
                Err(e) => {
                    self.navigator
                        .push(&login_failure_route(&self.config.routes.login));
                    Err(e)
                }
            }
        }
        .instrument(tracing::info_span!(AuthSpanNames::COMPLETE_LOGIN))
        .await
    }
}

#[async_trait]
impl<T: HttpTransport, N: Navigator> AuthorizationFlow for AuthorizationFlowCoordinator<T, N> {
    async fn start_login(&self) -> AuthResult<String> {
        async {
            self.begin(FlowPhase::FetchingState);

            let result = match self.fetch_state().await {
                Ok(state) => self.authorization_url(&state),
                Err(e) => Err(e),
            };

            match result {
                Ok(url) => {
                    tracing::info!(endpoint = %self.config.provider.connect_endpoint(), "redirecting to provider");
                    self.finish(FlowPhase::Redirecting);
                    self.navigator.redirect(&url);
                    Ok(url)
                }
                Err(e) => {
                    self.fail(AuthSpanNames::START_LOGIN, &e);
                    Err(e)
                }
            }
        }
        .instrument(tracing::info_span!(AuthSpanNames::START_LOGIN))
        .await
    }

    async fn handle_callback(&self, code: &str, state: &str) -> AuthResult<SessionGrant> {
        async {
            self.begin(FlowPhase::Exchanging);

            let result = match Self::validate_callback(code, state) {
                Ok(()) => self.exchange(code, state).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(grant) => {
                    tracing::info!(user_id = grant.user.id, "authorization code exchanged");
                    self.finish(FlowPhase::Completed);
                    Ok(grant)
                }
                Err(e) => {
                    self.fail(AuthSpanNames::HANDLE_CALLBACK, &e);
                    Err(e)
                }
            }
        }
        .instrument(tracing::info_span!(AuthSpanNames::HANDLE_CALLBACK))
        .await
    }
}
