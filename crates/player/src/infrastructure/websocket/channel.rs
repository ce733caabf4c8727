//! Resilient push channel
//!
//! Owns at most one live socket. On connect it announces the stored
//! username, replays the cached roster and then pumps frames both ways.
//! Any loss that was not requested locally leads to `Reconnecting`, a fixed
//! delay and a connect attempt against the other endpoint, forever.
//!
//! The whole lifecycle runs in one task. A socket is dropped before the
//! next one is opened, so frames from a dead connection never surface.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use scramble_protocol::{paths, ClientMessage, PlayerScore, ServerMessage};

use crate::infrastructure::endpoints::{Endpoint, EndpointSet};
use crate::infrastructure::websocket::reconnect::{ReconnectSchedule, RECONNECT_DELAY};
use crate::ports::outbound::{
    storage_keys, ChannelEvent, ChannelEventSink, ConnectionState, PushConnector, PushSocket,
    StorageProvider, TransportError,
};

/// Push channel configured against an endpoint set, not yet running.
pub struct ResilientPushChannel {
    connector: Arc<dyn PushConnector>,
    endpoints: EndpointSet,
    storage: Arc<dyn StorageProvider>,
    sink: Arc<dyn ChannelEventSink>,
    schedule: ReconnectSchedule,
    state: Arc<AtomicU8>,
}

/// Running push channel. Dropping the handle stops the channel too.
pub struct PushChannelHandle {
    state: Arc<AtomicU8>,
    shutdown: oneshot::Sender<()>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    task: JoinHandle<()>,
}

impl PushChannelHandle {
    pub fn state(&self) -> ConnectionState {
        state_from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Queue a message for the server.
    ///
    /// It is written once a connection is up, after that connection's
    /// register message.
    pub fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Closed)
    }

    /// Close the socket, cancel any pending reconnect and wait for the
    /// channel task to finish.
    pub async fn disconnect(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Push channel task failed: {}", e);
        }
    }
}

enum SessionEnd {
    Shutdown,
    Lost(TransportError),
}

enum Step {
    Shutdown,
    Outbound(ClientMessage),
    Inbound(Option<Result<String, TransportError>>),
}

impl ResilientPushChannel {
    pub fn new(
        connector: Arc<dyn PushConnector>,
        endpoints: EndpointSet,
        storage: Arc<dyn StorageProvider>,
        sink: Arc<dyn ChannelEventSink>,
    ) -> Self {
        Self {
            connector,
            endpoints,
            storage,
            sink,
            schedule: ReconnectSchedule::new(RECONNECT_DELAY),
            state: Arc::new(AtomicU8::new(state_to_u8(ConnectionState::Disconnected))),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.schedule = ReconnectSchedule::new(delay);
        self
    }

    /// Start connecting to the primary in a background task.
    pub fn spawn(self) -> PushChannelHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(self.run(outbound_rx, shutdown_rx));

        PushChannelHandle {
            state,
            shutdown: shutdown_tx,
            outbound: outbound_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            let target = self.schedule.target();
            let endpoint = self.endpoints.get(target).clone();
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                _ = &mut shutdown => break,
                result = self.open(&endpoint) => result,
            };

            match connected {
                Ok(socket) => {
                    tracing::info!(endpoint = %endpoint, role = %target, "Push channel connected");
                    self.schedule.mark_connected();
                    self.set_state(ConnectionState::Connected);

                    match self.serve(socket, &mut outbound, &mut shutdown).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Lost(e) => {
                            tracing::warn!(endpoint = %endpoint, error = %e, "Push connection lost");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Push connect failed");
                }
            }

            self.set_state(ConnectionState::Reconnecting);
            let (delay, next) = self.schedule.next_attempt();
            tracing::info!(
                attempt = self.schedule.attempts(),
                delay_ms = delay.as_millis() as u64,
                next = %next,
                "Scheduling push reconnect"
            );

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Push channel stopped");
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn PushSocket>, TransportError> {
        let url = endpoint
            .ws_url(paths::WEBSOCKET)
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        self.connector.connect(url.as_str()).await
    }

    async fn serve(
        &self,
        mut socket: Box<dyn PushSocket>,
        outbound: &mut mpsc::UnboundedReceiver<ClientMessage>,
        shutdown: &mut oneshot::Receiver<()>,
    ) -> SessionEnd {
        if let Err(e) = self.announce(socket.as_mut()).await {
            return SessionEnd::Lost(e);
        }
        self.replay_roster();

        loop {
            let step = tokio::select! {
                _ = &mut *shutdown => Step::Shutdown,
                Some(message) = outbound.recv() => Step::Outbound(message),
                incoming = socket.next_text() => Step::Inbound(incoming),
            };

            match step {
                Step::Shutdown => {
                    socket.close().await;
                    return SessionEnd::Shutdown;
                }
                Step::Outbound(message) => {
                    if let Err(e) = write_message(socket.as_mut(), &message).await {
                        return SessionEnd::Lost(e);
                    }
                }
                Step::Inbound(Some(Ok(text))) => self.handle_frame(&text),
                Step::Inbound(Some(Err(e))) => return SessionEnd::Lost(e),
                Step::Inbound(None) => return SessionEnd::Lost(TransportError::Closed),
            }
        }
    }

    /// Send `register` when a username is stored. Always the first frame.
    async fn announce(&self, socket: &mut dyn PushSocket) -> Result<(), TransportError> {
        match self
            .storage
            .load(storage_keys::USERNAME)
            .filter(|name| !name.is_empty())
        {
            Some(username) => write_message(socket, &ClientMessage::Register { username }).await,
            None => {
                tracing::error!("Username not found in storage, not registering");
                Ok(())
            }
        }
    }

    fn replay_roster(&self) {
        let Some(cached) = self.storage.load(storage_keys::PLAYER_LIST) else {
            return;
        };
        match serde_json::from_str::<Vec<PlayerScore>>(&cached) {
            Ok(players) => self.sink.deliver(ChannelEvent::RosterReplayed(players)),
            Err(e) => tracing::warn!("Ignoring unreadable cached roster: {}", e),
        }
    }

    fn handle_frame(&self, text: &str) {
        match ServerMessage::parse(text) {
            Ok(message) => self.sink.deliver(ChannelEvent::Message(message)),
            Err(e) => tracing::warn!("Failed to parse server message: {}", e),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state_to_u8(state), Ordering::SeqCst);
        tracing::debug!(?state, "Push channel state changed");
        self.sink.deliver(ChannelEvent::StateChanged(state));
    }
}

fn state_to_u8(state: ConnectionState) -> u8 {
    match state {
        ConnectionState::Disconnected => 0,
        ConnectionState::Connecting => 1,
        ConnectionState::Connected => 2,
        ConnectionState::Reconnecting => 3,
    }
}

fn state_from_u8(value: u8) -> ConnectionState {
    match value {
        1 => ConnectionState::Connecting,
        2 => ConnectionState::Connected,
        3 => ConnectionState::Reconnecting,
        _ => ConnectionState::Disconnected,
    }
}

async fn write_message(
    socket: &mut dyn PushSocket,
    message: &ClientMessage,
) -> Result<(), TransportError> {
    let text =
        serde_json::to_string(message).map_err(|e| TransportError::Request(e.to_string()))?;
    socket.send_text(text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::platform::MemoryStorageProvider;
    use crate::infrastructure::testing::{RecordingSink, ScriptedConnection, ScriptedConnector};

    const PRIMARY_WS: &str = "ws://localhost:8080/ws";
    const SECONDARY_WS: &str = "ws://localhost:8081/ws";

    fn register(username: &str) -> String {
        serde_json::to_string(&ClientMessage::Register {
            username: username.into(),
        })
        .unwrap()
    }

    fn storage_with_username(username: &str) -> Arc<MemoryStorageProvider> {
        let storage = Arc::new(MemoryStorageProvider::default());
        storage.save(storage_keys::USERNAME, username);
        storage
    }

    fn spawn_channel(
        connector: &ScriptedConnector,
        storage: Arc<MemoryStorageProvider>,
        sink: &RecordingSink,
    ) -> PushChannelHandle {
        ResilientPushChannel::new(
            Arc::new(connector.clone()),
            EndpointSet::default(),
            storage,
            Arc::new(sink.clone()),
        )
        .spawn()
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..2_000 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test(start_paused = true)]
    async fn abnormal_close_alternates_endpoints_after_fixed_delay() {
        let connector = ScriptedConnector::new([
            ScriptedConnection::AcceptThenClose(vec![]),
            ScriptedConnection::AcceptThenClose(vec![]),
            ScriptedConnection::AcceptAndHold(vec![]),
        ]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| handle.state() == ConnectionState::Connected && connector.attempts().len() == 3)
            .await;

        let attempts = connector.attempts();
        let urls: Vec<_> = attempts.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec![PRIMARY_WS, SECONDARY_WS, PRIMARY_WS]);

        for pair in attempts.windows(2) {
            let gap = pair[1].at - pair[0].at;
            assert!(gap >= RECONNECT_DELAY, "reconnected too early: {gap:?}");
            assert!(gap < RECONNECT_DELAY + Duration::from_millis(50));
        }

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refused_connect_also_flips_endpoint() {
        let connector = ScriptedConnector::new([
            ScriptedConnection::Refuse,
            ScriptedConnection::AcceptAndHold(vec![]),
        ]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| handle.state() == ConnectionState::Connected).await;

        let urls: Vec<_> = connector.attempts().into_iter().map(|a| a.url).collect();
        assert_eq!(urls, vec![PRIMARY_WS.to_string(), SECONDARY_WS.to_string()]);
        assert_eq!(
            sink.states(),
            vec![
                ConnectionState::Connecting,
                ConnectionState::Reconnecting,
                ConnectionState::Connecting,
                ConnectionState::Connected,
            ]
        );

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn register_precedes_queued_outbound_traffic() {
        let connector = ScriptedConnector::new([ScriptedConnection::AcceptAndHold(vec![])]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        handle
            .send(ClientMessage::Register {
                username: "queued".into(),
            })
            .unwrap();

        wait_until(|| connector.sent(0).len() == 2).await;

        assert_eq!(connector.sent(0), vec![register("alice"), register("queued")]);

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn every_reconnect_registers_exactly_once() {
        let connector = ScriptedConnector::new([
            ScriptedConnection::AcceptThenClose(vec![]),
            ScriptedConnection::AcceptAndHold(vec![]),
        ]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| connector.sent(1).len() == 1).await;

        assert_eq!(connector.sent(0), vec![register("alice")]);
        assert_eq!(connector.sent(1), vec![register("alice")]);

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn missing_username_skips_register() {
        let frame = r#"{"type":"game_over","payload":{"winner":"bob"}}"#.to_string();
        let connector = ScriptedConnector::new([ScriptedConnection::AcceptAndHold(vec![frame])]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, Arc::new(MemoryStorageProvider::default()), &sink);

        wait_until(|| !sink.messages().is_empty()).await;

        assert!(connector.sent(0).is_empty());

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cached_roster_is_replayed_after_connect() {
        let storage = storage_with_username("alice");
        storage.save(
            storage_keys::PLAYER_LIST,
            r#"[{"name":"alice","score":3},{"name":"bob","score":1}]"#,
        );
        let connector = ScriptedConnector::new([ScriptedConnection::AcceptAndHold(vec![])]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage, &sink);

        wait_until(|| sink.events().len() >= 3).await;

        assert_eq!(
            sink.events()[..3],
            [
                ChannelEvent::StateChanged(ConnectionState::Connecting),
                ChannelEvent::StateChanged(ConnectionState::Connected),
                ChannelEvent::RosterReplayed(vec![
                    PlayerScore::new("alice", 3),
                    PlayerScore::new("bob", 1),
                ]),
            ]
        );

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_delivered_in_order_and_garbage_is_skipped() {
        let frames = vec![
            r#"{"type":"player_list","payload":{"players":[{"name":"alice","score":1}]}}"#
                .to_string(),
            "not json".to_string(),
            r#"{"type":"chat","payload":{"text":"hi"}}"#.to_string(),
            r#"{"type":"game_over","payload":{"winner":"alice"}}"#.to_string(),
        ];
        let connector = ScriptedConnector::new([ScriptedConnection::AcceptAndHold(frames)]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| sink.messages().len() == 3).await;

        assert_eq!(
            sink.messages(),
            vec![
                ServerMessage::PlayerList {
                    players: vec![PlayerScore::new("alice", 1)]
                },
                ServerMessage::Unknown {
                    kind: "chat".into()
                },
                ServerMessage::GameOver {
                    winner: "alice".into()
                },
            ]
        );

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn frames_from_a_failed_socket_never_surface() {
        let roster = |name: &str| {
            format!(r#"{{"type":"player_list","payload":{{"players":[{{"name":"{name}","score":0}}]}}}}"#)
        };
        let connector = ScriptedConnector::new([
            ScriptedConnection::FailMidStream {
                before: vec![roster("early")],
                after: vec![roster("stale")],
            },
            ScriptedConnection::AcceptAndHold(vec![roster("fresh")]),
        ]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| sink.messages().len() == 2).await;
        tokio::time::sleep(RECONNECT_DELAY * 2).await;

        let names: Vec<String> = sink
            .messages()
            .into_iter()
            .filter_map(|message| match message {
                ServerMessage::PlayerList { players } => Some(players[0].name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["early".to_string(), "fresh".to_string()]);

        handle.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_cancels_pending_reconnect() {
        let connector = ScriptedConnector::new([ScriptedConnection::Refuse]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| handle.state() == ConnectionState::Reconnecting).await;
        handle.disconnect().await;
        tokio::time::sleep(RECONNECT_DELAY * 3).await;

        assert_eq!(sink.states().last(), Some(&ConnectionState::Disconnected));
        assert_eq!(connector.attempts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_channel() {
        let connector = ScriptedConnector::new([ScriptedConnection::AcceptAndHold(vec![])]);
        let sink = RecordingSink::default();
        let handle = spawn_channel(&connector, storage_with_username("alice"), &sink);

        wait_until(|| handle.state() == ConnectionState::Connected).await;
        drop(handle);

        wait_until(|| sink.states().last() == Some(&ConnectionState::Disconnected)).await;
        tokio::time::sleep(RECONNECT_DELAY * 3).await;
        assert_eq!(connector.attempts().len(), 1);
    }

    #[test]
    fn state_encoding_roundtrips() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
        ] {
            assert_eq!(state_from_u8(state_to_u8(state)), state);
        }
    }
}
