//! HTTP Port - Object-safe request boundary
//!
//! One call is one attempt against one fully-qualified URL. Endpoint
//! selection and fallback live above this port, in the resilient request
//! client, so adapters stay dumb.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Every game route is a JSON `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

/// A single outbound HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

/// Raw status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete an exchange with one endpoint.
///
/// Shared by the HTTP and WebSocket ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Connection closed")]
    Closed,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request and return whatever status the server answered with.
    ///
    /// Only failures to obtain a response at all are errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}
