//! Ports - boundaries between the session layer and the outside world
//!
//! Only outbound ports exist: the session layer drives HTTP, WebSocket,
//! storage and presentation through these traits.

pub mod outbound;
