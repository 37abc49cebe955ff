//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tracklink_entity::link::{Link, LinkStatus};
use tracklink_entity::user::{User, UserRole};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login response. The token is also set as an HttpOnly cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// A link as shown in the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub original_url: String,
    /// Public tracking URL handed out to recipients.
    pub download_url: String,
    pub status: LinkStatus,
    pub is_active: bool,
    pub max_downloads: Option<i64>,
    pub current_downloads: i64,
    pub remaining_downloads: Option<i64>,
    pub expiration_hours: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_valid: Option<bool>,
    pub last_checked: Option<DateTime<Utc>>,
    pub status_code: Option<i32>,
    pub error: Option<String>,
}

impl LinkResponse {
    /// Render `link` with its status as of `now`.
    pub fn from_link(link: Link, download_url: String, now: DateTime<Utc>) -> Self {
        Self {
            status: link.status_at(now),
            remaining_downloads: link.remaining_downloads(),
            download_url,
            id: link.id,
            title: link.title,
            original_url: link.original_url,
            is_active: link.is_active,
            max_downloads: link.max_downloads,
            current_downloads: link.current_downloads,
            expiration_hours: link.expiration_hours,
            created_at: link.created_at,
            expires_at: link.expires_at,
            is_valid: link.is_valid,
            last_checked: link.last_checked,
            status_code: link.status_code,
            error: link.error,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
