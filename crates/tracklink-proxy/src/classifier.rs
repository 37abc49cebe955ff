//! Resource classification by declared content type.

use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// What an upstream response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A provider landing page to inspect.
    Html,
    /// Anything else, streamed through untouched.
    Binary,
}

/// Classify a response from its headers alone; the body is never sniffed.
///
/// HTML iff the content type contains `text/html`. A missing or unreadable
/// header is binary.
pub fn classify(headers: &HeaderMap) -> ResourceKind {
    let is_html = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));

    if is_html {
        ResourceKind::Html
    } else {
        ResourceKind::Binary
    }
}
