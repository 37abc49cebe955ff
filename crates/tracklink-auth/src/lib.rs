//! # tracklink-auth
//!
//! Argon2 password handling and opaque-token sessions for the admin panel.
//! The download endpoint never consults this crate.

pub mod password;
pub mod session;

pub use password::{PasswordHasher, PasswordValidator};
pub use session::{
    MemorySessionStore, SessionCleanup, SessionData, SessionManager, SessionStore,
};
