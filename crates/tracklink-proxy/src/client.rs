//! Upstream HTTP client.
//!
//! Two underlying clients share the same timeouts: one follows redirects
//! (the first fetch and liveness probes), the other never does so that a
//! redirect on an extracted link can be relayed to the caller.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, Method, Response, redirect};
use tracing::{debug, warn};
use url::Url;

use tracklink_core::config::ProxyConfig;
use tracklink_core::error::{AppError, ErrorKind};

use crate::error::FetchError;

/// Response body handed to the HTTP layer.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Redirect hops allowed on following requests.
const MAX_REDIRECTS: usize = 10;

/// HTTP client for upstream fetches and probes.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    follow: Client,
    manual: Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl UpstreamClient {
    /// Build the client pair from proxy configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let connect_timeout = Duration::from_secs(config.connect_timeout_seconds);

        let builder = |policy: redirect::Policy| {
            Client::builder()
                .user_agent(config.user_agent.clone())
                .connect_timeout(connect_timeout)
                .read_timeout(timeout)
                .redirect(policy)
                .build()
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Configuration,
                        format!("Failed to build HTTP client: {e}"),
                        e,
                    )
                })
        };

        Ok(Self {
            follow: builder(redirect::Policy::limited(MAX_REDIRECTS))?,
            manual: builder(redirect::Policy::none())?,
            timeout,
            probe_timeout: Duration::from_secs(config.probe_timeout_seconds),
        })
    }

    /// Parse a URL and reject anything that is not http or https.
    pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
        let url = Url::parse(raw.trim()).map_err(|_| FetchError::InvalidUrl {
            url: raw.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(FetchError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: other.to_string(),
            }),
        }
    }

    /// GET following redirects server-side.
    pub async fn get(&self, url: &Url) -> Result<Response, FetchError> {
        self.send(&self.follow, Method::GET, url, self.timeout).await
    }

    /// GET that returns 3xx responses as-is.
    pub async fn get_no_redirect(&self, url: &Url) -> Result<Response, FetchError> {
        self.send(&self.manual, Method::GET, url, self.timeout).await
    }

    /// HEAD probe following redirects, bounded by the probe timeout.
    pub async fn head(&self, url: &Url) -> Result<Response, FetchError> {
        self.send(&self.follow, Method::HEAD, url, self.probe_timeout)
            .await
    }

    async fn send(
        &self,
        client: &Client,
        method: Method,
        url: &Url,
        budget: Duration,
    ) -> Result<Response, FetchError> {
        debug!(method = %method, url = %url, "Upstream request");

        let request = client.request(method, url.clone()).send();
        match tokio::time::timeout(budget, request).await {
            Ok(Ok(response)) => {
                debug!(url = %url, status = response.status().as_u16(), "Upstream response");
                Ok(response)
            }
            Ok(Err(e)) => Err(FetchError::from_reqwest(url.as_str(), e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Turn a response body into a [`ByteStream`].
///
/// A read error after the first byte only ends the stream; it is logged here
/// because the status line has already gone out.
pub fn into_byte_stream(response: Response) -> ByteStream {
    let url = response.url().to_string();
    Box::pin(response.bytes_stream().map(move |chunk| {
        chunk.map_err(|e| {
            warn!(url = %url, error = %e, "Upstream stream aborted");
            std::io::Error::other(e)
        })
    }))
}
