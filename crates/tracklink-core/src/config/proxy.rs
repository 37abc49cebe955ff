//! Upstream fetch and landing-page extraction configuration.

use serde::{Deserialize, Serialize};

/// Settings for the download proxy's upstream HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Inactivity timeout for upstream fetches in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Total budget for a HEAD liveness probe in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// User-Agent sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Provider landing-page extraction.
    #[serde(default)]
    pub landing_page: LandingPageConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            probe_timeout_seconds: default_probe_timeout(),
            user_agent: default_user_agent(),
            landing_page: LandingPageConfig::default(),
        }
    }
}

/// Domains whose HTML pages embed the real download link in script data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPageConfig {
    /// Whether landing-page extraction is attempted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Host patterns; a host matches when equal to a pattern or a subdomain of it.
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
}

impl Default for LandingPageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            domains: default_domains(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("tracklink/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_domains() -> Vec<String> {
    vec!["mediafire.com".to_string()]
}
