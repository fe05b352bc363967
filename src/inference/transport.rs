//! HTTP transport seam.
//!
//! The dispatcher never talks to `reqwest` directly; it is handed an
//! `Arc<dyn Transport>` so tests can swap in a stub and gateways can wrap
//! their own client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

/// Errors raised while exchanging a request body for a response body.
#[derive(Debug)]
pub enum TransportError {
    /// The request did not complete within the allotted time.
    Timeout,
    /// Connection-level failure (DNS, refused, reset, TLS).
    Connect(String),
    /// Server answered with a non-2xx status.
    Status { status: u16, body: String },
    /// Response body was not a decodable provider envelope.
    Decode(String),
    /// Request body could not be serialized.
    Encode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Connect(msg) => write!(f, "connection error: {msg}"),
            TransportError::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            TransportError::Decode(msg) => write!(f, "decode error: {msg}"),
            TransportError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// A single JSON POST.
#[derive(Debug, Clone)]
pub struct PostRequest<'a> {
    pub url: &'a str,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer_token: Option<&'a str>,
    pub body: serde_json::Value,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response body of a 2xx reply.
    async fn post_json(&self, request: PostRequest<'_>) -> Result<String, TransportError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connect(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: PostRequest<'_>) -> Result<String, TransportError> {
        let mut builder = self
            .client
            .post(request.url)
            .json(&request.body);
        if let Some(token) = request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        debug!("{} responded with status {}", request.url, response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("{} returned HTTP {}: {}", request.url, status, body);
            return Err(TransportError::Status { status, body });
        }

        response.text().await.map_err(map_reqwest_error)
    }
}
