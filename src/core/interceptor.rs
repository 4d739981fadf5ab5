//! Credential Interceptor
//!
//! Attaches the current bearer token to each outgoing request and turns a
//! 401 from any authenticated call into a session teardown.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{HttpRequest, HttpResponse, HttpTransport, Navigator};
use crate::error::AuthError;

/// Source of the bearer credential for outgoing requests.
pub trait CredentialSource: Send + Sync {
    /// Current bearer token, read at request time.
    fn bearer_token(&self) -> Option<String>;

    /// Called when the backend rejects the credential.
    fn on_unauthorized(&self);
}

/// Transport wrapper that attaches credentials per request.
///
/// Requests that already carry an `authorization` header are left alone.
pub struct BearerAuthTransport<T: HttpTransport, C: CredentialSource, N: Navigator> {
    inner: Arc<T>,
    credentials: Arc<C>,
    navigator: Arc<N>,
    login_route: String,
}

impl<T: HttpTransport, C: CredentialSource, N: Navigator> BearerAuthTransport<T, C, N> {
    pub fn new(
        inner: Arc<T>,
        credentials: Arc<C>,
        navigator: Arc<N>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            credentials,
            navigator,
            login_route: login_route.into(),
        }
    }
}

#[async_trait]
impl<T: HttpTransport, C: CredentialSource, N: Navigator> HttpTransport
    for BearerAuthTransport<T, C, N>
{
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, AuthError> {
        let attached = match self.credentials.bearer_token() {
            Some(token) if request.header("authorization").is_none() => {
                request = request.with_bearer(&token);
                true
            }
            _ => false,
        };

        let url = request.url.clone();
        let response = self.inner.send(request).await?;

        if response.status == 401 && attached {
            tracing::warn!(url = %url, "credential rejected, tearing down session");
            self.credentials.on_unauthorized();
            self.navigator.redirect(&self.login_route);
        }

        Ok(response)
    }
}
