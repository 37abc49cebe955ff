//! Domain entities for TrackLink.
//!
//! Plain data types shared by the persistence, service and API layers.
//! Rows derive `sqlx::FromRow`; lifecycle rules that depend only on a
//! record's own fields live here as methods.

pub mod link;
pub mod user;

pub use link::{CreateLink, Link, LinkStatus, LinkUpdate};
pub use user::{CreateUser, User, UserRole};
