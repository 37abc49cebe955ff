//! Public download path.

pub mod error;
pub mod orchestrator;

pub use error::DownloadError;
pub use orchestrator::{DownloadOrchestrator, DownloadResponse, DownloadStream};
