//! Push Port - persistent server connection boundary
//!
//! A `PushConnector` opens one socket to one URL. Reconnection, endpoint
//! alternation and identity announcement are the push channel's job.

use async_trait::async_trait;

use scramble_protocol::{PlayerScore, ServerMessage};

use super::TransportError;

/// Connection state of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the server
    #[default]
    Disconnected,
    /// Attempting to establish connection
    Connecting,
    /// Successfully connected
    Connected,
    /// Connection lost, waiting to try the other endpoint
    Reconnecting,
}

/// One open text-frame socket.
#[async_trait]
pub trait PushSocket: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Next inbound text frame; `None` once the socket is closed.
    async fn next_text(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self);
}

#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushSocket>, TransportError>;
}

/// What the push channel reports upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    StateChanged(ConnectionState),
    Message(ServerMessage),
    /// Cached roster replayed right after a (re)connect
    RosterReplayed(Vec<PlayerScore>),
}

/// Receiver of push channel events.
pub trait ChannelEventSink: Send + Sync {
    fn deliver(&self, event: ChannelEvent);
}
