//! Application layer: session state, update routing and the client facade.

pub mod dispatcher;
pub mod error;
pub mod scramble;
pub mod session;
pub mod session_state;

pub use dispatcher::EventDispatcher;
pub use error::SessionError;
pub use session::{assemble_guess, GameClient, GameSession, StartedGame};
pub use session_state::{GamePhase, GameSessionState, SessionTimings, SessionUpdate};
