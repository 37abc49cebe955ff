//! Link management: CRUD, lifecycle transitions and liveness probes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use tracklink_core::error::AppError;
use tracklink_database::LinkStore;
use tracklink_entity::link::{CreateLink, Link, LinkUpdate};
use tracklink_proxy::UpstreamClient;

use crate::context::RequestContext;

const MAX_TITLE_LEN: usize = 200;
/// Ten years.
const MAX_EXPIRATION_HOURS: i64 = 87_600;
/// Concurrent HEAD probes during a bulk check.
const CHECK_CONCURRENCY: usize = 4;

/// Editable link fields. Nested options distinguish "unchanged" from "clear".
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<Option<String>>,
    pub original_url: Option<String>,
    pub max_downloads: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

/// Outcome of a liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct LinkCheck {
    pub link_id: Uuid,
    pub is_valid: bool,
    pub status_code: Option<i32>,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Link management for authenticated panel users.
#[derive(Debug, Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    client: Arc<UpstreamClient>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(store: Arc<dyn LinkStore>, client: Arc<UpstreamClient>) -> Self {
        Self { store, client }
    }

    /// Validate and persist a new link.
    pub async fn create(&self, ctx: &RequestContext, data: CreateLink) -> Result<Link, AppError> {
        let data = CreateLink {
            title: normalize_title(data.title)?,
            original_url: validate_url(&data.original_url)?,
            max_downloads: validate_positive("max_downloads", data.max_downloads, i64::MAX)?,
            expiration_hours: validate_positive(
                "expiration_hours",
                data.expiration_hours,
                MAX_EXPIRATION_HOURS,
            )?,
        };

        let link = self.store.create_link(&data).await?;
        info!(
            actor = %ctx.user_id,
            link_id = %link.id,
            max_downloads = ?link.max_downloads,
            expires_at = ?link.expires_at,
            "Link created"
        );
        Ok(link)
    }

    /// All links, newest first.
    pub async fn list(&self, _ctx: &RequestContext) -> Result<Vec<Link>, AppError> {
        self.store.get_all_links().await
    }

    /// One link by id.
    pub async fn get(&self, _ctx: &RequestContext, id: Uuid) -> Result<Link, AppError> {
        self.find(id).await
    }

    /// Apply an edit. Switching a link back on is refused while it is
    /// expired or over quota, judged against the edited cap.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let link = self.find(id).await?;

        let update = LinkUpdate {
            title: patch.title.map(normalize_title).transpose()?,
            original_url: patch
                .original_url
                .as_deref()
                .map(validate_url)
                .transpose()?,
            max_downloads: patch
                .max_downloads
                .map(|max| validate_positive("max_downloads", max, i64::MAX))
                .transpose()?,
            is_active: patch.is_active,
            ..LinkUpdate::default()
        };

        if update.is_active == Some(true) && !link.is_active {
            let mut prospective = link.clone();
            if let Some(max) = update.max_downloads {
                prospective.max_downloads = max;
            }
            ensure_reactivatable(&prospective, Utc::now())?;
        }

        self.store.update_link(id, &update).await?;
        info!(actor = %ctx.user_id, link_id = %id, "Link updated");
        self.find(id).await
    }

    /// Remove a link.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_link(id).await? {
            return Err(AppError::not_found("Link not found"));
        }
        info!(actor = %ctx.user_id, link_id = %id, "Link deleted");
        Ok(())
    }

    /// Administrative switch-off.
    pub async fn deactivate(&self, ctx: &RequestContext, id: Uuid) -> Result<Link, AppError> {
        if !self.store.deactivate_link(id).await? {
            return Err(AppError::not_found("Link not found"));
        }
        info!(actor = %ctx.user_id, link_id = %id, "Link deactivated");
        self.find(id).await
    }

    /// Zero the counter and switch the link back on unless it has expired.
    pub async fn reset_downloads(&self, ctx: &RequestContext, id: Uuid) -> Result<Link, AppError> {
        let link = self.find(id).await?;
        let update = LinkUpdate {
            current_downloads: Some(0),
            is_active: Some(!link.is_expired_at(Utc::now())),
            ..LinkUpdate::default()
        };
        self.store.update_link(id, &update).await?;
        info!(actor = %ctx.user_id, link_id = %id, "Download count reset");
        self.find(id).await
    }

    /// Probe the original URL and record the result. Never changes `is_active`.
    pub async fn check(&self, ctx: &RequestContext, id: Uuid) -> Result<LinkCheck, AppError> {
        let link = self.find(id).await?;
        let result = self.probe_and_record(&link).await?;
        info!(
            actor = %ctx.user_id,
            link_id = %id,
            is_valid = result.is_valid,
            status = ?result.status_code,
            "Link checked"
        );
        Ok(result)
    }

    /// Probe, then reactivate if the link is valid, unexpired and under quota.
    pub async fn refresh(&self, ctx: &RequestContext, id: Uuid) -> Result<Link, AppError> {
        let link = self.find(id).await?;
        let result = self.probe_and_record(&link).await?;

        if result.is_valid && !link.is_active && link.can_reactivate_at(Utc::now()) {
            let update = LinkUpdate {
                is_active: Some(true),
                ..LinkUpdate::default()
            };
            self.store.update_link(id, &update).await?;
            info!(actor = %ctx.user_id, link_id = %id, "Link reactivated by refresh");
        }
        self.find(id).await
    }

    /// Probe every link.
    pub async fn check_all(&self, ctx: &RequestContext) -> Result<Vec<LinkCheck>, AppError> {
        let links = self.store.get_all_links().await?;
        let total = links.len();

        let results: Vec<LinkCheck> = stream::iter(links)
            .map(|link| async move { self.probe_and_record(&link).await })
            .buffer_unordered(CHECK_CONCURRENCY)
            .try_collect()
            .await?;

        let valid = results.iter().filter(|r| r.is_valid).count();
        info!(actor = %ctx.user_id, total, valid, "Bulk link check finished");
        Ok(results)
    }

    async fn probe_and_record(&self, link: &Link) -> Result<LinkCheck, AppError> {
        let (is_valid, status_code, error) = match UpstreamClient::parse_url(&link.original_url) {
            Err(e) => (false, None, Some(e.to_string())),
            Ok(url) => match self.client.head(&url).await {
                Ok(response) => {
                    let status = response.status();
                    let error = (status.as_u16() >= 400).then(|| format!("HTTP {status}"));
                    (error.is_none(), Some(i32::from(status.as_u16())), error)
                }
                Err(e) => (false, None, Some(e.to_string())),
            },
        };

        let checked_at = Utc::now();
        let update = LinkUpdate {
            is_valid: Some(Some(is_valid)),
            last_checked: Some(Some(checked_at)),
            status_code: Some(status_code),
            error: Some(error.clone()),
            ..LinkUpdate::default()
        };
        self.store.update_link(link.id, &update).await?;

        Ok(LinkCheck {
            link_id: link.id,
            is_valid,
            status_code,
            error,
            checked_at,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Link, AppError> {
        self.store
            .get_link(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found"))
    }
}

fn ensure_reactivatable(link: &Link, now: DateTime<Utc>) -> Result<(), AppError> {
    if link.is_expired_at(now) {
        return Err(AppError::validation("Cannot reactivate an expired link"));
    }
    if link.is_quota_exhausted() {
        return Err(AppError::validation(
            "Cannot reactivate a link that reached its download limit",
        ));
    }
    Ok(())
}

fn normalize_title(title: Option<String>) -> Result<Option<String>, AppError> {
    let Some(title) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(Some(title))
}

fn validate_url(raw: &str) -> Result<String, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::validation("original_url is required"));
    }
    UpstreamClient::parse_url(raw)
        .map(|url| url.to_string())
        .map_err(|_| AppError::validation("original_url must be an http or https URL"))
}

fn validate_positive(field: &str, value: Option<i64>, max: i64) -> Result<Option<i64>, AppError> {
    match value {
        Some(v) if v < 1 => Err(AppError::validation(format!(
            "{field} must be at least 1"
        ))),
        Some(v) if v > max => Err(AppError::validation(format!(
            "{field} must be at most {max}"
        ))),
        other => Ok(other),
    }
}
