//! Platform abstraction ports
//!
//! Durable client-side storage. Values stored here are caches and
//! last-known identity, never authoritative game state.

/// Persistent key/value storage (file-based on desktop, in-memory in tests)
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Storage key constants
///
/// These are kept in the ports layer as they define the contract for
/// what keys are used across the application.
pub mod storage_keys {
    /// Username announced on every push-channel (re)connect
    pub const USERNAME: &str = "username";
    /// Server-assigned player id used by every HTTP request
    pub const PLAYER_ID: &str = "userId";
    /// JSON roster cache replayed on reconnect
    pub const PLAYER_LIST: &str = "playerList";
}
