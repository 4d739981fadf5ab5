//! HTTP Transport
//!
//! HTTP client interface and implementations for backend requests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::error::{AuthError, ConfigurationError, ProtocolError, TransportError};

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL, query included.
    pub url: String,
    /// Request headers (lowercase names).
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// JSON GET request.
    pub fn get(url: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers,
            body: None,
            timeout: None,
        }
    }

    /// JSON POST request.
    pub fn post_json<B: serde::Serialize>(url: impl Into<String>, body: &B) -> Result<Self, AuthError> {
        let body = serde_json::to_string(body).map_err(|e| {
            AuthError::Configuration(ConfigurationError::InvalidValue {
                field: "request body".to_string(),
                message: e.to_string(),
            })
        })?;
        let mut request = Self::get(url);
        request.method = HttpMethod::Post;
        request
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        request.body = Some(body);
        Ok(request)
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a bearer credential.
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.headers
            .insert("authorization".to_string(), format!("Bearer {}", token));
        self
    }

    /// Get a header value by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Create a JSON response.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: body.to_string(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a success body, or turn the response into a protocol error.
    pub fn into_json<T: serde::de::DeserializeOwned>(self) -> Result<T, AuthError> {
        if !self.is_success() {
            return Err(AuthError::from_response(self.status, &self.body));
        }

        serde_json::from_str(&self.body).map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidResponse {
                status: self.status,
                message: e.to_string(),
            })
        })
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    ///
    /// Non-2xx statuses are returned as responses; only failures to get a
    /// response at all are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        (**self).send(request).await
    }
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestHttpTransport {
    /// Create new transport with default settings.
    pub fn new() -> Result<Self, AuthError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AuthError::Configuration(ConfigurationError::InvalidValue {
                    field: "http client".to_string(),
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder = req_builder.timeout(timeout);

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AuthError::Transport(TransportError::Timeout { timeout })
            } else {
                AuthError::Transport(TransportError::ConnectionFailed {
                    message: e.to_string(),
                })
            }
        })?;

        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_lowercase(), v.to_string());
            }
        }

        let body = response.text().await.map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidResponse {
                status,
                message: e.to_string(),
            })
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

type SendHook = Box<dyn Fn(&HttpRequest) + Send + Sync>;

/// Mock HTTP transport for testing.
///
/// Responses are served in the order they were queued.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    request_history: Mutex<Vec<HttpRequest>>,
    send_hook: Mutex<Option<SendHook>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response(&self, status: u16, body: serde_json::Value) -> &Self {
        self.queue_response(HttpResponse::json(status, &body))
    }

    /// Queue a transport failure.
    pub fn queue_failure(&self, error: TransportError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Run `hook` on every request before answering it.
    pub fn set_send_hook(&self, hook: impl Fn(&HttpRequest) + Send + Sync + 'static) -> &Self {
        *self.send_hook.lock() = Some(Box::new(hook));
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        if let Some(hook) = self.send_hook.lock().as_ref() {
            hook(&request);
        }

        self.request_history.lock().push(request);

        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(error)) => Err(AuthError::Transport(error)),
            None => Err(AuthError::Transport(TransportError::ConnectionFailed {
                message: "No mock response available".to_string(),
            })),
        }
    }
}
