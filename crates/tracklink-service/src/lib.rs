//! # tracklink-service
//!
//! Business logic for TrackLink. Services receive their collaborators as
//! `Arc`s at construction time; the API layer only translates HTTP.

pub mod context;
pub mod download;
pub mod link;
pub mod user;

pub use context::RequestContext;
pub use download::{DownloadError, DownloadOrchestrator, DownloadResponse, DownloadStream};
pub use link::{LinkCheck, LinkPatch, LinkService};
pub use user::{CreateUserRequest, UserService};
