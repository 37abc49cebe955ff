//! Link entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::LinkStatus;

/// A tracking link proxying downloads of `original_url`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Link {
    /// Opaque identifier exposed in `/download/{id}`.
    pub id: Uuid,
    /// Optional display label.
    pub title: Option<String>,
    /// Source URL to proxy.
    pub original_url: String,
    /// Download cap; `None` means unlimited.
    pub max_downloads: Option<i64>,
    /// Successful download attempts so far.
    pub current_downloads: i64,
    /// Lifetime requested at creation.
    pub expiration_hours: Option<i64>,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// Computed once at creation from `expiration_hours`; never recomputed.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the link currently serves downloads.
    pub is_active: bool,
    /// Outcome of the last liveness probe.
    pub is_valid: Option<bool>,
    /// When the last liveness probe ran.
    pub last_checked: Option<DateTime<Utc>>,
    /// HTTP status of the last liveness probe.
    pub status_code: Option<i32>,
    /// Error of the last liveness probe.
    pub error: Option<String>,
}

impl Link {
    /// Whether `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    /// Whether the download cap has been consumed.
    pub fn is_quota_exhausted(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.current_downloads >= max)
    }

    /// Downloads left before the cap; `None` when unlimited.
    pub fn remaining_downloads(&self) -> Option<i64> {
        self.max_downloads
            .map(|max| (max - self.current_downloads).max(0))
    }

    /// Lifecycle status at `now`. Expiry outranks the quota, which outranks
    /// a plain deactivation.
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_expired_at(now) {
            LinkStatus::Expired
        } else if self.is_quota_exhausted() {
            LinkStatus::LimitReached
        } else if !self.is_active {
            LinkStatus::Deactivated
        } else {
            LinkStatus::Active
        }
    }

    /// Whether the link could be switched back on at `now`.
    pub fn can_reactivate_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_quota_exhausted()
    }
}

/// Data required to create a new link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLink {
    /// Optional display label.
    pub title: Option<String>,
    /// Source URL to proxy.
    pub original_url: String,
    /// Optional download cap.
    pub max_downloads: Option<i64>,
    /// Optional lifetime in hours.
    pub expiration_hours: Option<i64>,
}

impl CreateLink {
    /// Expiry instant for a link created at `created_at`.
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expiration_hours
            .map(|hours| created_at + Duration::hours(hours))
    }
}

/// Typed partial update over the mutable link columns.
///
/// Nested `Option`s distinguish "leave unchanged" (`None`) from "clear"
/// (`Some(None)`) for nullable columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkUpdate {
    pub title: Option<Option<String>>,
    pub original_url: Option<String>,
    pub max_downloads: Option<Option<i64>>,
    pub current_downloads: Option<i64>,
    pub is_active: Option<bool>,
    pub is_valid: Option<Option<bool>>,
    pub last_checked: Option<Option<DateTime<Utc>>>,
    pub status_code: Option<Option<i32>>,
    pub error: Option<Option<String>>,
}

impl LinkUpdate {
    /// Whether no column would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Update switching the link off.
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}
