//! The transport seam: executes a signed request and returns the raw response.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cloudwire_auth::SignedRequest;
use cloudwire_core::ClientConfig;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::{debug, instrument};

/// Errors raised before a response was received.
///
/// These are never decoded: a transport failure has no body to read.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be handed to the HTTP client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other client failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// A received HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body bytes; `None` when the response had no body.
    pub body: Option<Bytes>,
}

impl Response {
    /// A response with no headers and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// A header value as text.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Executes signed requests.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request` and collect the full response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response was received.
    async fn execute(&self, request: &SignedRequest) -> Result<Response, TransportError>;
}

/// Production transport over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    /// Build a transport using the configured request timeout.
    ///
    /// # Errors
    ///
    /// See [`ReqwestTransport::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(config.request_timeout())
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.request().method(), uri = %request.request().uri()))]
    async fn execute(&self, request: &SignedRequest) -> Result<Response, TransportError> {
        let inner = request.request();
        let mut builder = self
            .client
            .request(inner.method().clone(), inner.uri().to_string())
            .headers(inner.headers().clone());
        if let Some(body) = inner.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| classify(&e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| classify(&e))?;
        debug!(status = %status, len = body.len(), "Received response");

        Ok(Response {
            status,
            headers,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}
