//! `ChannelEventSink` that keeps everything it receives.

use std::sync::{Arc, Mutex};

use scramble_protocol::ServerMessage;

use crate::ports::outbound::{ChannelEvent, ChannelEventSink, ConnectionState};

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ChannelEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn states(&self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChannelEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<ServerMessage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChannelEvent::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl ChannelEventSink for RecordingSink {
    fn deliver(&self, event: ChannelEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
