//! Scramble Player - session layer for the word-scramble game client.
//!
//! Talks to a pair of game servers (primary and secondary) over HTTP and a
//! persistent WebSocket, fails over between them, and keeps the local game
//! state consistent with what the server pushes.
//!
//! - `ports`: traits for HTTP, WebSocket, storage and presentation
//! - `infrastructure`: reqwest / tokio-tungstenite / file adapters and the
//!   resilient request client and push channel built on them
//! - `application`: session state, event routing, the session actor
//! - `config`: environment-driven configuration

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::{GameClient, GameSession, SessionError};
pub use config::ClientConfig;
