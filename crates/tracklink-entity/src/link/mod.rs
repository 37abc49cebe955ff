//! Tracking link entities.

pub mod model;
pub mod status;

pub use model::{CreateLink, Link, LinkUpdate};
pub use status::LinkStatus;
