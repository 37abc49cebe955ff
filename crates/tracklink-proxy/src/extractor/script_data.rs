//! Extractor for pages embedding a `downloadlink` field in inline script data.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ExtractedLink, LandingPageExtractor};
use crate::filename::sanitize_filename;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("script block regex is valid")
});

static DOWNLOAD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""downloadlink"\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("downloadlink regex is valid")
});

const DATA_MARKER: &str = "\"downloadlink\"";
const METADATA_KEY: &str = "\"metadata\"";

/// Extracts links from providers whose pages carry
/// `"downloadlink":"..."` and `"metadata":{"name":"..."}` in a script tag.
#[derive(Debug, Clone)]
pub struct ScriptDataExtractor {
    domains: Vec<String>,
}

impl ScriptDataExtractor {
    /// Extractor for the given host patterns.
    pub fn new(domains: Vec<String>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }
}

impl LandingPageExtractor for ScriptDataExtractor {
    fn name(&self) -> &'static str {
        "script-data"
    }

    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }

    fn extract(&self, html: &str, _url: &Url) -> Option<ExtractedLink> {
        let block = SCRIPT_BLOCK
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .find(|body| body.contains(DATA_MARKER))?;

        let raw = DOWNLOAD_LINK.captures(block)?.get(1)?.as_str();
        let download_link = unescape_separators(raw);
        if download_link.is_empty() {
            return None;
        }

        Some(ExtractedLink {
            download_link,
            filename: metadata_name(block),
        })
    }
}

fn unescape_separators(raw: &str) -> String {
    raw.replace("\\/", "/")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
}

/// `name` of the JSON object following `"metadata":`, if it parses.
fn metadata_name(block: &str) -> Option<String> {
    let pos = block.find(METADATA_KEY)?;
    let rest = block[pos + METADATA_KEY.len()..].trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();

    let value = match serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()?
    {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Landing-page metadata is not valid JSON");
            return None;
        }
    };

    let name = sanitize_filename(value.get("name")?.as_str()?);
    (!name.is_empty()).then_some(name)
}
