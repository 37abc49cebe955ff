//! # tracklink-database
//!
//! SQLite connection management, embedded migrations and the repository
//! implementations for links and users.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::LinkStore;
