//! Push connection to the game server
//!
//! - `reconnect`: reconnect schedule (fixed delay, endpoint alternation)
//! - `channel`: the resilient push channel task
//! - `desktop`: tokio-tungstenite based transport

mod channel;
mod desktop;
mod reconnect;

pub use channel::{PushChannelHandle, ResilientPushChannel};
pub use reconnect::{ReconnectSchedule, RECONNECT_DELAY};
pub use desktop::TungsteniteConnector;
