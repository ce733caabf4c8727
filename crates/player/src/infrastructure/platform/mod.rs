//! Platform-specific implementations
//!
//! Implementations of the storage port defined in ports/outbound/platform.rs.

mod desktop;
mod mock;

pub use desktop::FileStorageProvider;
pub use mock::MemoryStorageProvider;
