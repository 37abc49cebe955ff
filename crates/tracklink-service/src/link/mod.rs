//! Link management and liveness probing.

pub mod service;

pub use service::{LinkCheck, LinkPatch, LinkService};
