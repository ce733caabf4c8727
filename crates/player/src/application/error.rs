//! Session error types

use crate::infrastructure::RequestError;

/// Error types for game session operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No player id stored; nothing was sent
    #[error("Not logged in")]
    NotLoggedIn,

    /// The game has ended; guesses are no longer accepted
    #[error("Game is over")]
    GameOver,

    /// The server answered but refused the action
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Server sent an unusable response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Request(#[from] RequestError),
}
