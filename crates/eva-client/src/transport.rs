//! HTTP transport seam.
//!
//! The tracking client hands fully-formed requests to a [`Transport`] and
//! never looks at responses beyond success or failure.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use eva_core::{ApiKey, Endpoint};
use thiserror::Error;

/// Default request timeout for the HTTP transport.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const CONTENT_TYPE: &str = "Content-Type";
pub const API_KEY_HEADER: &str = "X-API-Key";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Connection, timeout or protocol failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16 },
}

/// A JSON POST ready to go on the wire.
#[derive(Clone)]
pub struct OutboundRequest {
    pub endpoint: Endpoint,
    pub url: String,
    pub api_key: ApiKey,
    pub body: String,
}

impl OutboundRequest {
    /// Headers attached to every request.
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (CONTENT_TYPE, JSON_CONTENT_TYPE),
            (API_KEY_HEADER, self.api_key.expose()),
        ]
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("endpoint", &self.endpoint)
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("body", &self.body)
            .finish()
    }
}

/// Asynchronous request delivery.
///
/// Implementations decide their own timeout and connection policy. A
/// non-2xx status is reported as [`TransportError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts the request and returns the response status on success.
    async fn post(&self, request: OutboundRequest) -> Result<u16, TransportError>;
}

/// `reqwest`-backed transport.
///
/// # Thread Safety
///
/// The transport is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { http })
    }

    /// Wraps a preconfigured `reqwest` client.
    pub const fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: OutboundRequest) -> Result<u16, TransportError> {
        let mut builder = self.http.post(&request.url);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }
}
