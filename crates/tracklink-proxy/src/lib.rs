//! # tracklink-proxy
//!
//! Upstream side of the download proxy:
//!
//! - [`UpstreamClient`] issues GET/HEAD requests with the configured timeouts
//! - [`classify`] decides between an HTML landing page and a direct binary
//! - [`ExtractorRegistry`] pulls the real download link out of provider pages
//! - [`filename`] derives and encodes download filenames

pub mod classifier;
pub mod client;
pub mod error;
pub mod extractor;
pub mod filename;

pub use classifier::{ResourceKind, classify};
pub use client::{ByteStream, UpstreamClient, into_byte_stream};
pub use error::FetchError;
pub use extractor::{ExtractedLink, ExtractorRegistry, LandingPageExtractor, ScriptDataExtractor};
