//! Scramble Protocol - shared wire types for the player client and the game server
//!
//! This crate contains the types exchanged with the game server:
//! - HTTP request bodies (`/start`, `/submit`, `/menu`)
//! - HTTP response bodies
//! - WebSocket envelopes (`ClientMessage`, `ServerMessage`)
//! - Shared value objects (roster entries, menu choices)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Forward compatible** - Unknown server message kinds decode to `Unknown`

pub mod messages;
pub mod requests;
pub mod responses;
pub mod types;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{ClientMessage, ServerMessage};

// =============================================================================
// HTTP Types
// =============================================================================
pub use requests::{paths, MenuRequest, StartRequest, SubmitRequest};
pub use responses::{MenuResponse, StartResponse, SubmitResponse};

// =============================================================================
// Shared Types
// =============================================================================
pub use types::{MenuChoice, PlayerScore};
