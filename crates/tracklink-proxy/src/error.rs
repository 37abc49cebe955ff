//! Upstream fetch errors.

use thiserror::Error;

/// Errors raised while talking to an upstream host.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
    },

    /// Only plain and encrypted HTTP are proxied.
    #[error("unsupported scheme '{scheme}' in {url}")]
    UnsupportedScheme {
        /// The rejected URL.
        url: String,
        /// Its scheme.
        scheme: String,
    },

    /// No response within the configured budget.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// DNS, connect or TLS failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with an unusable status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Classify a client error, separating timeouts from other failures.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
