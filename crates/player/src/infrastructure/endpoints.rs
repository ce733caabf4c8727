//! Endpoint Set - the two server instances this client may talk to
//!
//! Both instances serve identical routes. The set is configured once and
//! never changes, so the "active" endpoint is always one of these two.

use std::fmt;

use url::Url;

/// Which member of the endpoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Primary,
    Secondary,
}

impl EndpointRole {
    /// The other endpoint.
    pub fn other(self) -> Self {
        match self {
            EndpointRole::Primary => EndpointRole::Secondary,
            EndpointRole::Secondary => EndpointRole::Primary,
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::Primary => write!(f, "primary"),
            EndpointRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// Host and port of one server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://host:port{path}`
    pub fn http_url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.url("http", path)
    }

    /// `ws://host:port{path}`
    pub fn ws_url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.url("ws", path)
    }

    fn url(&self, scheme: &str, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))?.join(path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Ordered pair of endpoints: primary first, secondary as fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    primary: Endpoint,
    secondary: Endpoint,
}

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PRIMARY_PORT: u16 = 8080;
pub const DEFAULT_SECONDARY_PORT: u16 = 8081;

impl Default for EndpointSet {
    fn default() -> Self {
        Self::new(
            Endpoint::new(DEFAULT_HOST, DEFAULT_PRIMARY_PORT),
            Endpoint::new(DEFAULT_HOST, DEFAULT_SECONDARY_PORT),
        )
    }
}

impl EndpointSet {
    pub fn new(primary: Endpoint, secondary: Endpoint) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, role: EndpointRole) -> &Endpoint {
        match role {
            EndpointRole::Primary => &self.primary,
            EndpointRole::Secondary => &self.secondary,
        }
    }

    pub fn primary(&self) -> &Endpoint {
        &self.primary
    }

    pub fn secondary(&self) -> &Endpoint {
        &self.secondary
    }
}
