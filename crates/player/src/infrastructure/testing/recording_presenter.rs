//! Presenter that records every call in order.

use std::sync::{Arc, Mutex};

use scramble_protocol::PlayerScore;

use crate::ports::outbound::{ConnectionState, GameOutcome, Notice, Presenter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Word(String),
    GuessFeedback(bool),
    HideGuessFeedback,
    Roster(Vec<PlayerScore>),
    GameOver(GameOutcome),
    LeaveGame,
    Notice(Notice),
    Connection(ConnectionState),
}

#[derive(Clone, Default)]
pub struct RecordingPresenter {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls other than connection status changes.
    pub fn game_calls(&self) -> Vec<PresenterCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, PresenterCall::Connection(_)))
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PresenterCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Presenter for RecordingPresenter {
    fn show_word(&self, scrambled: &str) {
        self.record(PresenterCall::Word(scrambled.to_string()));
    }

    fn show_guess_feedback(&self, correct: bool) {
        self.record(PresenterCall::GuessFeedback(correct));
    }

    fn hide_guess_feedback(&self) {
        self.record(PresenterCall::HideGuessFeedback);
    }

    fn show_roster(&self, roster: &[PlayerScore]) {
        self.record(PresenterCall::Roster(roster.to_vec()));
    }

    fn show_game_over(&self, outcome: &GameOutcome) {
        self.record(PresenterCall::GameOver(outcome.clone()));
    }

    fn leave_game(&self) {
        self.record(PresenterCall::LeaveGame);
    }

    fn notify(&self, notice: &Notice) {
        self.record(PresenterCall::Notice(notice.clone()));
    }

    fn connection_changed(&self, state: ConnectionState) {
        self.record(PresenterCall::Connection(state));
    }
}
