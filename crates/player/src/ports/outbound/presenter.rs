//! Presenter Port - presentation callbacks
//!
//! The session actor is the only caller, so implementations are invoked
//! from a single task and never concurrently. Calls are advisory; a
//! presenter cannot fail or veto a state change.

use std::fmt;

use scramble_protocol::PlayerScore;

use super::ConnectionState;

/// How the game ended for the local player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost { winner: String },
}

/// User-facing notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No player id stored; the user must log in first
    LoginRequired,
    /// The primary endpoint failed and the secondary is being tried
    Reconnecting,
    /// The secondary endpoint answered after the primary failed
    Reconnected,
    /// Neither endpoint answered
    ServerUnavailable,
    /// The server refused the action
    Rejected(String),
    /// The server answered with something this client cannot read
    BadResponse,
    /// Someone else won
    Winner(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoginRequired => write!(f, "Please log in first."),
            Notice::Reconnecting => write!(f, "Disconnected from the server. Reconnecting..."),
            Notice::Reconnected => write!(f, "Reconnected to the server!"),
            Notice::ServerUnavailable => {
                write!(f, "Unable to reconnect. Please try again later.")
            }
            Notice::Rejected(message) => write!(f, "{message}"),
            Notice::BadResponse => write!(f, "Unexpected response from the server."),
            Notice::Winner(winner) => write!(f, "{winner} won the game!"),
        }
    }
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Presenter: Send + Sync {
    /// Render a (scrambled) word
    fn show_word(&self, scrambled: &str);

    /// Show right/wrong feedback for the last guess
    fn show_guess_feedback(&self, correct: bool);

    /// Hide the guess feedback again
    fn hide_guess_feedback(&self);

    /// Render the roster in server order
    fn show_roster(&self, roster: &[PlayerScore]);

    /// Announce the end of the game
    fn show_game_over(&self, outcome: &GameOutcome);

    /// Navigate away from the game screen
    fn leave_game(&self);

    /// Surface a notice to the user
    fn notify(&self, notice: &Notice);

    /// Push channel status changed
    fn connection_changed(&self, state: ConnectionState);
}
