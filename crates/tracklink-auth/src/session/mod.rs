//! Opaque-token sessions.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::{LoginResult, SessionManager};
pub use store::{MemorySessionStore, SessionData, SessionStore};
