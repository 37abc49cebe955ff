//! Route handlers organized by domain.

pub mod auth;
pub mod download;
pub mod health;
pub mod link;
pub mod user;
