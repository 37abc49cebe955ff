//! Download orchestration: lifecycle checks, bookkeeping, fetch, classify,
//! extract and stream.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Response;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use tracklink_database::LinkStore;
use tracklink_entity::link::Link;
use tracklink_proxy::filename::{fallback_filename_from_url, parse_content_disposition};
use tracklink_proxy::{
    ByteStream, ExtractedLink, ExtractorRegistry, FetchError, ResourceKind, UpstreamClient,
    classify, into_byte_stream,
};

use super::error::DownloadError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Streamed file body with the headers to send.
pub struct DownloadStream {
    pub filename: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for DownloadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadStream")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// What the client receives for a servable link.
#[derive(Debug)]
pub enum DownloadResponse {
    /// Bytes from the original or extracted URL.
    Stream(DownloadStream),
    /// A landing page with no extractable link, delivered as an attachment.
    Page { filename: String, body: Bytes },
    /// The extracted link redirected; the client follows it itself.
    Redirect { location: String },
}

/// Serves `/download/{id}`.
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    store: Arc<dyn LinkStore>,
    client: Arc<UpstreamClient>,
    extractors: Arc<ExtractorRegistry>,
}

impl DownloadOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        store: Arc<dyn LinkStore>,
        client: Arc<UpstreamClient>,
        extractors: Arc<ExtractorRegistry>,
    ) -> Self {
        Self {
            store,
            client,
            extractors,
        }
    }

    /// Serve one download request for link `id`.
    ///
    /// Counter and deactivation writes run in a detached task; their failure
    /// never reaches the caller.
    pub async fn serve(&self, id: Uuid) -> Result<DownloadResponse, DownloadError> {
        let link = self
            .store
            .get_link(id)
            .await?
            .ok_or(DownloadError::NotFound)?;

        self.admit(&link, Utc::now()).await?;
        self.record_download(&link);

        let original = UpstreamClient::parse_url(&link.original_url)?;
        let fallback = fallback_filename_from_url(&original);

        let response = ensure_success(self.client.get(&original).await?)?;

        match classify(response.headers()) {
            ResourceKind::Binary => {
                let filename = response
                    .headers()
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_disposition)
                    .unwrap_or(fallback);
                info!(link_id = %id, filename = %filename, "Streaming direct download");
                Ok(DownloadResponse::Stream(stream_from(response, filename)))
            }
            ResourceKind::Html => {
                // Where the page was actually served from, after redirects.
                let page_url = response.url().clone();
                let html = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::from_reqwest(page_url.to_string(), e))?;

                match self
                    .extractors
                    .extract(&String::from_utf8_lossy(&html), &original)
                {
                    Some(found) => self.serve_extracted(id, &page_url, found, fallback).await,
                    None => {
                        info!(link_id = %id, "No download link in page, delivering HTML");
                        Ok(DownloadResponse::Page {
                            filename: format!("{fallback}.html"),
                            body: html,
                        })
                    }
                }
            }
        }
    }

    /// Lifecycle gate. An observed expiry or exhausted quota on a link that
    /// is still active switches it off before rejecting.
    async fn admit(&self, link: &Link, now: DateTime<Utc>) -> Result<(), DownloadError> {
        let rejection = if link.is_expired_at(now) {
            DownloadError::Expired
        } else if link.is_quota_exhausted() {
            DownloadError::LimitReached
        } else if !link.is_active {
            return Err(DownloadError::Inactive);
        } else {
            return Ok(());
        };

        if link.is_active {
            match self.store.deactivate_link(link.id).await {
                Ok(_) => info!(link_id = %link.id, reason = %rejection, "Link deactivated"),
                Err(e) => {
                    warn!(link_id = %link.id, error = %e, "Failed to deactivate link")
                }
            }
        }
        Err(rejection)
    }

    fn record_download(&self, link: &Link) {
        let store = Arc::clone(&self.store);
        let id = link.id;
        let max = link.max_downloads;

        tokio::spawn(async move {
            let count = match store.increment_download_count(id).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(link_id = %id, error = %e, "Failed to increment download count");
                    return;
                }
            };
            debug!(link_id = %id, count, "Download recorded");

            if max.is_some_and(|max| count >= max) {
                match store.deactivate_link(id).await {
                    Ok(_) => info!(link_id = %id, count, "Download limit reached, link deactivated"),
                    Err(e) => {
                        warn!(link_id = %id, error = %e, "Failed to deactivate link at limit")
                    }
                }
            }
        });
    }

    /// Second fetch against the link found in a landing page. Relative links
    /// resolve against `page_url`. Redirects are relayed, not followed.
    async fn serve_extracted(
        &self,
        id: Uuid,
        page_url: &Url,
        found: ExtractedLink,
        fallback: String,
    ) -> Result<DownloadResponse, DownloadError> {
        let target = page_url
            .join(&found.download_link)
            .map_err(|_| FetchError::InvalidUrl {
                url: found.download_link.clone(),
            })?;
        let target = UpstreamClient::parse_url(target.as_str())?;

        let response = self.client.get_no_redirect(&target).await?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| target.join(loc).ok())
                .ok_or_else(|| FetchError::Status {
                    url: target.to_string(),
                    status: response.status().as_u16(),
                })?;
            info!(link_id = %id, location = %location, "Relaying upstream redirect");
            return Ok(DownloadResponse::Redirect {
                location: location.to_string(),
            });
        }

        let response = ensure_success(response)?;
        let filename = found.filename.unwrap_or(fallback);
        info!(link_id = %id, filename = %filename, "Streaming extracted download");
        Ok(DownloadResponse::Stream(stream_from(response, filename)))
    }
}

fn ensure_success(response: Response) -> Result<Response, FetchError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: response.url().to_string(),
            status: response.status().as_u16(),
        })
    }
}

fn stream_from(response: Response, filename: String) -> DownloadStream {
    let headers = response.headers();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    DownloadStream {
        filename,
        content_type,
        content_length,
        body: into_byte_stream(response),
    }
}
