//! Game session actor and client facade
//!
//! `GameSession` is the only writer of `GameSessionState`. It drains one
//! queue fed by the push channel (through the dispatcher), by request
//! results and by its own timers, applies each update and carries out the
//! resulting effects. Readers observe state through a watch channel.
//!
//! `GameClient` is what the UI calls. It checks preconditions locally,
//! talks to the server through the resilient request client and feeds the
//! outcome back into the queue.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use scramble_protocol::{
    paths, MenuChoice, MenuRequest, MenuResponse, StartRequest, StartResponse, SubmitRequest,
    SubmitResponse,
};

use crate::application::dispatcher::EventDispatcher;
use crate::application::error::SessionError;
use crate::application::scramble::scramble;
use crate::application::session_state::{
    Effect, GameSessionState, Presentation, SessionTimings, SessionUpdate,
};
use crate::infrastructure::{RequestError, ResilientRequestClient};
use crate::ports::outbound::{storage_keys, Notice, Presenter, StorageProvider};

const START_REJECTED: &str = "Error starting the game.";
const MENU_REJECTED: &str = "Error processing menu selection.";

/// Concatenate per-letter input cells into a guess, trimming each cell.
pub fn assemble_guess<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|cell| cell.as_ref().trim().to_string())
        .collect()
}

// =============================================================================
// Session actor
// =============================================================================

pub struct GameSession {
    state: GameSessionState,
    presenter: Arc<dyn Presenter>,
    storage: Arc<dyn StorageProvider>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    timers: mpsc::WeakUnboundedSender<SessionUpdate>,
    snapshots: watch::Sender<GameSessionState>,
}

impl GameSession {
    /// Process updates until every producer is gone.
    pub async fn run(mut self) {
        while let Some(update) = self.updates.recv().await {
            self.handle(update);
        }
        tracing::debug!("Game session stopped");
    }

    fn handle(&mut self, update: SessionUpdate) {
        if matches!(update, SessionUpdate::GameOver { .. }) {
            self.state.set_username(self.storage.load(storage_keys::USERNAME));
        }

        for effect in self.state.apply(update) {
            self.execute(effect);
        }
        self.snapshots.send_replace(self.state.clone());
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::Present(presentation) => self.present(presentation),
            Effect::Persist { key, value } => self.storage.save(key, &value),
            Effect::Schedule { after, update } => self.schedule(after, update),
        }
    }

    fn present(&self, presentation: Presentation) {
        match presentation {
            Presentation::Word(word) => self.presenter.show_word(&scramble(&word)),
            Presentation::GuessFeedback(correct) => self.presenter.show_guess_feedback(correct),
            Presentation::HideGuessFeedback => self.presenter.hide_guess_feedback(),
            Presentation::Roster(roster) => self.presenter.show_roster(&roster),
            Presentation::GameOver(outcome) => self.presenter.show_game_over(&outcome),
            Presentation::LeaveGame => self.presenter.leave_game(),
            Presentation::Notice(notice) => self.presenter.notify(&notice),
            Presentation::Connection(state) => self.presenter.connection_changed(state),
        }
    }

    /// Post `update` back into the queue after `after`. Timers are never
    /// cancelled; a superseded one still fires.
    fn schedule(&self, after: Duration, update: SessionUpdate) {
        let Some(queue) = self.timers.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = queue.send(update);
        });
    }
}

// =============================================================================
// Client facade
// =============================================================================

/// Result of a successful `/start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedGame {
    pub player_id: String,
    pub word: String,
}

#[derive(Clone)]
pub struct GameClient {
    requests: ResilientRequestClient,
    storage: Arc<dyn StorageProvider>,
    dispatcher: EventDispatcher,
    snapshots: watch::Receiver<GameSessionState>,
}

impl GameClient {
    /// Build the client and its session actor. The caller spawns
    /// [`GameSession::run`].
    pub fn new(
        requests: ResilientRequestClient,
        storage: Arc<dyn StorageProvider>,
        presenter: Arc<dyn Presenter>,
        timings: SessionTimings,
    ) -> (Self, GameSession) {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let timers = updates_tx.downgrade();
        let dispatcher = EventDispatcher::new(updates_tx);

        let notices = dispatcher.clone();
        let requests = requests.with_notices(Arc::new(move |notice: Notice| {
            notices.submit(SessionUpdate::Notice(notice));
        }));

        let state = GameSessionState::new(timings).with_identity(
            storage.load(storage_keys::USERNAME),
            storage.load(storage_keys::PLAYER_ID),
        );
        let (snapshots_tx, snapshots_rx) = watch::channel(state.clone());

        let session = GameSession {
            state,
            presenter,
            storage: Arc::clone(&storage),
            updates: updates_rx,
            timers,
            snapshots: snapshots_tx,
        };
        let client = Self {
            requests,
            storage,
            dispatcher,
            snapshots: snapshots_rx,
        };
        (client, session)
    }

    /// Sink for the push channel.
    pub fn dispatcher(&self) -> EventDispatcher {
        self.dispatcher.clone()
    }

    pub fn snapshot(&self) -> GameSessionState {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSessionState> {
        self.snapshots.clone()
    }

    /// `POST /menu`.
    pub async fn choose_menu(&self, choice: MenuChoice) -> Result<(), SessionError> {
        let player_id = self.require_player_id()?;
        let response: MenuResponse = self
            .post(paths::MENU, &MenuRequest { player_id, choice })
            .await?;

        if !response.success {
            return Err(self.reject(response.message, MENU_REJECTED));
        }
        tracing::info!(choice = choice.as_str(), "Menu selection accepted");
        Ok(())
    }

    /// `POST /start`.
    pub async fn start_game(&self) -> Result<StartedGame, SessionError> {
        let player_id = self.require_player_id()?;
        let response: StartResponse = self
            .post(
                paths::START,
                &StartRequest {
                    player_id: player_id.clone(),
                },
            )
            .await?;

        if !response.success {
            return Err(self.reject(response.message, START_REJECTED));
        }

        let word = response
            .word
            .filter(|w| !w.is_empty())
            .ok_or_else(|| self.malformed(paths::START, "start without a word"))?;
        let player_id = response
            .player_id
            .filter(|id| !id.is_empty())
            .unwrap_or(player_id);

        self.dispatcher.submit(SessionUpdate::GameStarted {
            player_id: player_id.clone(),
            word: word.clone(),
        });
        Ok(StartedGame { player_id, word })
    }

    /// `POST /submit`. The guess is sent as given; the server decides.
    pub async fn submit_guess(&self, guess: &str) -> Result<SubmitResponse, SessionError> {
        if self.snapshots.borrow().is_over() {
            return Err(SessionError::GameOver);
        }
        let player_id = self.require_player_id()?;
        let response: SubmitResponse = self
            .post(
                paths::SUBMIT,
                &SubmitRequest {
                    player_id,
                    guess: guess.to_string(),
                },
            )
            .await?;

        if response.correct {
            self.dispatcher.submit(SessionUpdate::CorrectGuess {
                new_word: response.new_word.clone(),
            });
        } else {
            self.dispatcher.submit(SessionUpdate::IncorrectGuess);
        }
        if let Some(players) = response.roster() {
            self.dispatcher.submit(SessionUpdate::Roster(players.to_vec()));
        }
        if let Some(winner) = response.winner() {
            self.dispatcher.submit(SessionUpdate::GameOver {
                winner: winner.to_string(),
            });
        }
        Ok(response)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.requests.post_json(path, body).await.map_err(|e| match e {
            RequestError::Decode(reason) => self.malformed(path, &reason),
            other => SessionError::Request(other),
        })
    }

    fn malformed(&self, path: &str, reason: &str) -> SessionError {
        tracing::warn!(path, reason, "Unusable server response");
        self.dispatcher
            .submit(SessionUpdate::Notice(Notice::BadResponse));
        SessionError::MalformedResponse(reason.to_string())
    }

    fn require_player_id(&self) -> Result<String, SessionError> {
        match self
            .storage
            .load(storage_keys::PLAYER_ID)
            .filter(|id| !id.is_empty())
        {
            Some(id) => Ok(id),
            None => {
                tracing::warn!("No player id stored, user must log in");
                self.dispatcher
                    .submit(SessionUpdate::Notice(Notice::LoginRequired));
                Err(SessionError::NotLoggedIn)
            }
        }
    }

    fn reject(&self, message: Option<String>, fallback: &str) -> SessionError {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        tracing::warn!(message = %message, "Server rejected request");
        self.dispatcher
            .submit(SessionUpdate::Notice(Notice::Rejected(message.clone())));
        SessionError::Rejected(message)
    }
}
