//! Auth Client
//!
//! Wires the flow coordinator, the session store and the credential
//! interceptor around one transport and one navigator.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{BearerAuthTransport, HttpTransport, Navigator, ReqwestHttpTransport};
use crate::error::AuthResult;
use crate::flows::{AuthorizationFlow, AuthorizationFlowCoordinator};
use crate::session::{FileTokenPersistence, SessionStore, TokenPersistence};
use crate::types::{AuthConfig, Profile};

/// Transport for application API calls, carrying the session's credential.
pub type ApiTransport<T, P, N> = BearerAuthTransport<T, SessionStore<T, P>, N>;

/// Authentication client.
pub struct AuthClient<
    N: Navigator,
    T: HttpTransport = ReqwestHttpTransport,
    P: TokenPersistence = FileTokenPersistence,
> {
    config: AuthConfig,
    session: Arc<SessionStore<T, P>>,
    navigator: Arc<N>,
    flow: AuthorizationFlowCoordinator<T, N>,
    api: Arc<ApiTransport<T, P, N>>,
}

impl<N: Navigator> AuthClient<N> {
    /// Create a client over reqwest, persisting the token under `token_dir`.
    pub fn new(config: AuthConfig, navigator: N, token_dir: impl Into<PathBuf>) -> AuthResult<Self> {
        let transport = ReqwestHttpTransport::with_timeout(config.timeout)?;
        Ok(Self::with_components(
            config,
            transport,
            FileTokenPersistence::new(token_dir),
            navigator,
        ))
    }
}

impl<N: Navigator, T: HttpTransport, P: TokenPersistence> AuthClient<N, T, P> {
    /// Create a client with custom implementations.
    pub fn with_components(config: AuthConfig, transport: T, persistence: P, navigator: N) -> Self {
        let transport = Arc::new(transport);
        let navigator = Arc::new(navigator);
        let session = Arc::new(SessionStore::new(
            config.clone(),
            transport.clone(),
            Arc::new(persistence),
        ));
        let flow =
            AuthorizationFlowCoordinator::new(config.clone(), transport.clone(), navigator.clone());
        let api = Arc::new(BearerAuthTransport::new(
            transport,
            session.clone(),
            navigator.clone(),
            config.routes.login.clone(),
        ));

        Self {
            config,
            session,
            navigator,
            flow,
            api,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore<T, P>> {
        &self.session
    }

    pub fn flow(&self) -> &AuthorizationFlowCoordinator<T, N> {
        &self.flow
    }

    /// Transport for authenticated application calls.
    pub fn api_transport(&self) -> Arc<ApiTransport<T, P, N>> {
        self.api.clone()
    }

    /// Begin a provider login. See [`AuthorizationFlow::start_login`].
    pub async fn start_login(&self) -> AuthResult<String> {
        self.flow.start_login().await
    }

    /// Finish a provider login from its callback URL.
    pub async fn complete_login(&self, callback_url: &str) -> AuthResult<Profile> {
        self.flow.complete_login(callback_url, &*self.session).await
    }

    /// Fetch the profile for a restored token.
    ///
    /// A rejected token ends the session and sends the user to the login route.
    pub async fn restore(&self) -> AuthResult<Option<Profile>> {
        match self.session.get_current_user().await {
            Err(e) if e.is_auth_expiry() => {
                self.navigator.redirect(&self.config.routes.login);
                Err(e)
            }
            result => result,
        }
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}

/// Create an authentication client with default implementations.
pub fn auth_client<N: Navigator>(
    config: AuthConfig,
    navigator: N,
    token_dir: impl Into<PathBuf>,
) -> AuthResult<AuthClient<N>> {
    AuthClient::new(config, navigator, token_dir)
}
