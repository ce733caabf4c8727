//! Event Dispatcher
//!
//! The single entry point into the session actor's queue. The push channel
//! delivers `ChannelEvent`s here; request handling submits `SessionUpdate`s
//! directly. Both end up, in arrival order, on the same queue.

use tokio::sync::mpsc;

use scramble_protocol::ServerMessage;

use crate::application::session_state::SessionUpdate;
use crate::ports::outbound::{ChannelEvent, ChannelEventSink};

#[derive(Clone)]
pub struct EventDispatcher {
    updates: mpsc::UnboundedSender<SessionUpdate>,
}

impl EventDispatcher {
    pub fn new(updates: mpsc::UnboundedSender<SessionUpdate>) -> Self {
        Self { updates }
    }

    /// Queue an update for the session actor.
    pub fn submit(&self, update: SessionUpdate) {
        if self.updates.send(update).is_err() {
            tracing::debug!("Game session has stopped, dropping update");
        }
    }
}

/// Map a push channel event to a session update.
///
/// Unknown server message kinds map to nothing.
pub fn route(event: ChannelEvent) -> Option<SessionUpdate> {
    match event {
        ChannelEvent::StateChanged(state) => Some(SessionUpdate::ConnectionChanged(state)),
        ChannelEvent::RosterReplayed(players) => Some(SessionUpdate::RosterReplayed(players)),
        ChannelEvent::Message(ServerMessage::PlayerList { players }) => {
            Some(SessionUpdate::Roster(players))
        }
        ChannelEvent::Message(ServerMessage::GameOver { winner }) => {
            Some(SessionUpdate::GameOver { winner })
        }
        ChannelEvent::Message(ServerMessage::Unknown { kind }) => {
            tracing::debug!(kind = %kind, "Ignoring unknown server message");
            None
        }
    }
}

impl ChannelEventSink for EventDispatcher {
    fn deliver(&self, event: ChannelEvent) {
        if let Some(update) = route(event) {
            self.submit(update);
        }
    }
}
