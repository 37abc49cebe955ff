//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;

pub use auth::{AuthUser, session_token};
pub use json::ValidatedJson;
pub use path::IdPath;
