//! Test doubles for the outbound ports.
//!
//! Available under `cfg(test)` and the `testing` feature.

mod recording_presenter;
mod recording_sink;
mod scripted_push;

pub use recording_presenter::{PresenterCall, RecordingPresenter};
pub use recording_sink::RecordingSink;
pub use scripted_push::{ConnectAttempt, ScriptedConnection, ScriptedConnector};
