//! Concrete repositories over the SQLite pool.

pub mod link;
pub mod user;

pub use link::LinkRepository;
pub use user::UserRepository;
