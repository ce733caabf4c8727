//! Infrastructure adapters: HTTP, WebSocket, storage.

pub mod endpoints;
pub mod http_client;
pub mod platform;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use endpoints::{Endpoint, EndpointRole, EndpointSet};
pub use http_client::{ReqwestTransport, RequestError, ResilientRequestClient};
