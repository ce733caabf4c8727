//! Scripted `PushConnector` for driving the push channel without a network.
//!
//! Each connect attempt consumes the next scripted outcome. Once the script
//! is exhausted every further attempt is accepted and held open, so a test
//! never spins through reconnects it did not ask for.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::ports::outbound::{PushConnector, PushSocket, TransportError};

/// Outcome of one connect attempt.
#[derive(Debug, Clone)]
pub enum ScriptedConnection {
    Refuse,
    /// Accept, deliver the frames, then report the socket closed by the server
    AcceptThenClose(Vec<String>),
    /// Accept, deliver the frames, then stay open until closed locally
    AcceptAndHold(Vec<String>),
    /// Accept, deliver `before`, fail with a read error, then keep `after`
    /// queued for anyone who reads the dead socket again
    FailMidStream { before: Vec<String>, after: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ConnectAttempt {
    pub url: String,
    pub at: Instant,
}

#[derive(Default)]
struct ScriptState {
    script: VecDeque<ScriptedConnection>,
    attempts: Vec<ConnectAttempt>,
    /// Frames written by the client, one list per accepted connection
    sent: Vec<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConnector {
    pub fn new(script: impl IntoIterator<Item = ScriptedConnection>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                script: script.into_iter().collect(),
                ..ScriptState::default()
            })),
        }
    }

    pub fn attempts(&self) -> Vec<ConnectAttempt> {
        self.state
            .lock()
            .map(|s| s.attempts.clone())
            .unwrap_or_default()
    }

    /// Frames the client wrote on the `index`-th accepted connection.
    pub fn sent(&self, index: usize) -> Vec<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.sent.get(index).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushConnector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushSocket>, TransportError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| TransportError::Connect("script poisoned".into()))?;
        state.attempts.push(ConnectAttempt {
            url: url.to_string(),
            at: Instant::now(),
        });

        let (frames, hold): (VecDeque<_>, _) = match state.script.pop_front() {
            Some(ScriptedConnection::Refuse) => {
                return Err(TransportError::Connect("connection refused".into()))
            }
            Some(ScriptedConnection::AcceptThenClose(frames)) => {
                (frames.into_iter().map(Ok).collect(), false)
            }
            Some(ScriptedConnection::AcceptAndHold(frames)) => {
                (frames.into_iter().map(Ok).collect(), true)
            }
            Some(ScriptedConnection::FailMidStream { before, after }) => {
                let frames = before
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(TransportError::Request(
                        "connection reset".into(),
                    ))))
                    .chain(after.into_iter().map(Ok))
                    .collect();
                (frames, false)
            }
            None => (VecDeque::new(), true),
        };

        let index = state.sent.len();
        state.sent.push(Vec::new());

        Ok(Box::new(ScriptedSocket {
            state: Arc::clone(&self.state),
            index,
            frames,
            hold,
            closed: false,
        }))
    }
}

struct ScriptedSocket {
    state: Arc<Mutex<ScriptState>>,
    index: usize,
    frames: VecDeque<Result<String, TransportError>>,
    hold: bool,
    closed: bool,
}

#[async_trait]
impl PushSocket for ScriptedSocket {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| TransportError::Request("script poisoned".into()))?;
        if let Some(sent) = state.sent.get_mut(self.index) {
            sent.push(text);
        }
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        if self.closed {
            return None;
        }
        if let Some(frame) = self.frames.pop_front() {
            return Some(frame);
        }
        if self.hold {
            std::future::pending::<()>().await;
        }
        None
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
