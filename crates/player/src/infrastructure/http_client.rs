//! HTTP access to the game server
//!
//! - `ReqwestTransport`: the `HttpTransport` adapter, one request per call
//! - `ResilientRequestClient`: primary first, secondary once, then give up
//!
//! There is no retry loop and no backoff here. A failed action is retried
//! by the user, not by the client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::infrastructure::endpoints::{EndpointRole, EndpointSet};
use crate::ports::outbound::{
    HttpMethod, HttpReply, HttpRequest, HttpTransport, Notice, TransportError,
};

// =============================================================================
// Transport adapter
// =============================================================================

/// `HttpTransport` backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReqwestTransport {
    /// Create a transport. `timeout` of `None` keeps reqwest's default
    /// behaviour (no overall request timeout).
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let builder = match request.method {
            HttpMethod::Post => self.client.post(&request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Connect(e.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}

// =============================================================================
// Resilient client
// =============================================================================

/// Why one endpoint did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Transport(TransportError),
    Status(u16),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) => write!(f, "{e}"),
            AttemptFailure::Status(status) => write!(f, "HTTP {status}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Both endpoints unreachable (primary: {primary}; secondary: {secondary})")]
    BothEndpointsUnreachable {
        primary: AttemptFailure,
        secondary: AttemptFailure,
    },
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<url::ParseError> for RequestError {
    fn from(e: url::ParseError) -> Self {
        RequestError::InvalidUrl(e.to_string())
    }
}

/// A 2xx response and the endpoint that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
    pub endpoint: EndpointRole,
    pub status: u16,
    pub body: String,
}

impl ResolvedResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_str(&self.body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

/// Callback for fallback notices.
pub type NoticeSink = Arc<dyn Fn(Notice) + Send + Sync>;

/// One logical request against the endpoint set.
///
/// The primary is always tried first. A transport error or non-2xx status
/// moves on to the secondary exactly once. An application-level rejection
/// (`success: false` in a 2xx body) is a normal response.
#[derive(Clone)]
pub struct ResilientRequestClient {
    transport: Arc<dyn HttpTransport>,
    endpoints: EndpointSet,
    notices: Option<NoticeSink>,
}

impl ResilientRequestClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: EndpointSet) -> Self {
        Self {
            transport,
            endpoints,
            notices: None,
        }
    }

    /// Report `Reconnecting`/`Reconnected`/`ServerUnavailable` to `sink`.
    pub fn with_notices(mut self, sink: NoticeSink) -> Self {
        self.notices = Some(sink);
        self
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body =
            serde_json::to_value(body).map_err(|e| RequestError::Serialize(e.to_string()))?;
        self.send(path, HttpMethod::Post, Some(body)).await?.json()
    }

    /// Send one logical request, falling back to the secondary at most once.
    pub async fn send(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Result<ResolvedResponse, RequestError> {
        let primary_url = self.endpoints.primary().http_url(path)?;
        let secondary_url = self.endpoints.secondary().http_url(path)?;

        let primary = match self
            .attempt(EndpointRole::Primary, primary_url.as_str(), method, body.clone())
            .await
        {
            Ok(response) => return Ok(response),
            Err(failure) => failure,
        };

        tracing::warn!(
            endpoint = %self.endpoints.primary(),
            path,
            error = %primary,
            "Primary endpoint failed, trying secondary"
        );
        self.notify(Notice::Reconnecting);

        match self
            .attempt(EndpointRole::Secondary, secondary_url.as_str(), method, body)
            .await
        {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.endpoints.secondary(),
                    path,
                    "Request served by secondary endpoint"
                );
                self.notify(Notice::Reconnected);
                Ok(response)
            }
            Err(secondary) => {
                tracing::error!(
                    path,
                    primary = %primary,
                    secondary = %secondary,
                    "Both endpoints failed"
                );
                self.notify(Notice::ServerUnavailable);
                Err(RequestError::BothEndpointsUnreachable { primary, secondary })
            }
        }
    }

    async fn attempt(
        &self,
        role: EndpointRole,
        url: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Result<ResolvedResponse, AttemptFailure> {
        let request = HttpRequest {
            method,
            url: url.to_string(),
            body,
        };
        let reply = self
            .transport
            .execute(request)
            .await
            .map_err(AttemptFailure::Transport)?;

        if !reply.is_success() {
            return Err(AttemptFailure::Status(reply.status));
        }

        Ok(ResolvedResponse {
            endpoint: role,
            status: reply.status,
            body: reply.body,
        })
    }

    fn notify(&self, notice: Notice) {
        if let Some(sink) = &self.notices {
            sink(notice);
        }
    }
}
