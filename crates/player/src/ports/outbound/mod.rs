//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application code to talk to the game server, durable storage and
//! the presentation layer without depending on concrete implementations.

pub mod http_port;
pub mod platform;
pub mod presenter;
pub mod push_port;

pub use http_port::{HttpMethod, HttpReply, HttpRequest, HttpTransport, TransportError};
pub use platform::{storage_keys, StorageProvider};
pub use presenter::{GameOutcome, Notice, Presenter};
pub use push_port::{ChannelEvent, ChannelEventSink, ConnectionState, PushConnector, PushSocket};

#[cfg(any(test, feature = "testing"))]
pub use http_port::MockHttpTransport;
#[cfg(any(test, feature = "testing"))]
pub use presenter::MockPresenter;
