//! Landing-page extraction.
//!
//! Some file hosts answer a download URL with an HTML page that embeds the
//! real file link in script data. Each provider gets a
//! [`LandingPageExtractor`]; the [`ExtractorRegistry`] picks the first one
//! whose URL predicate matches.

mod script_data;

pub use script_data::ScriptDataExtractor;

use tracing::debug;
use url::Url;

use tracklink_core::config::LandingPageConfig;

/// Real download location found in a landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Absolute URL of the file itself.
    pub download_link: String,
    /// Filename announced by the page, when it could be parsed.
    pub filename: Option<String>,
}

/// A provider-specific landing-page parser.
pub trait LandingPageExtractor: Send + Sync + std::fmt::Debug {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether pages fetched from `url` belong to this provider.
    fn matches(&self, url: &Url) -> bool;

    /// Pull the download link out of `html`. `None` when the page carries none.
    fn extract(&self, html: &str, url: &Url) -> Option<ExtractedLink>;
}

/// Ordered collection of extractors; the first match wins.
#[derive(Debug, Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn LandingPageExtractor>>,
}

impl ExtractorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the configured script-data provider, or nothing when
    /// extraction is disabled.
    pub fn from_config(config: &LandingPageConfig) -> Self {
        let mut registry = Self::new();
        if config.enabled && !config.domains.is_empty() {
            registry.register(Box::new(ScriptDataExtractor::new(config.domains.clone())));
        }
        registry
    }

    /// Append an extractor after the existing ones.
    pub fn register(&mut self, extractor: Box<dyn LandingPageExtractor>) {
        debug!(name = extractor.name(), "Registering landing-page extractor");
        self.extractors.push(extractor);
    }

    /// Number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractor is registered.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run the first extractor matching `url`.
    pub fn extract(&self, html: &str, url: &Url) -> Option<ExtractedLink> {
        let extractor = self.extractors.iter().find(|e| e.matches(url))?;
        let found = extractor.extract(html, url);
        debug!(
            extractor = extractor.name(),
            url = %url,
            found = found.is_some(),
            "Landing-page extraction"
        );
        found
    }
}
