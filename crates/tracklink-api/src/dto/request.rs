//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use tracklink_entity::link::CreateLink;
use tracklink_entity::user::UserRole;
use tracklink_service::{CreateUserRequest, LinkPatch};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /api/links` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLinkRequest {
    pub title: Option<String>,
    #[validate(length(min = 1, message = "original_url is required"))]
    pub original_url: String,
    #[validate(range(min = 1, message = "max_downloads must be at least 1"))]
    pub max_downloads: Option<i64>,
    #[validate(range(min = 1, message = "expiration_hours must be at least 1"))]
    pub expiration_hours: Option<i64>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        CreateLink {
            title: req.title,
            original_url: req.original_url,
            max_downloads: req.max_downloads,
            expiration_hours: req.expiration_hours,
        }
    }
}

/// `PUT /api/links/{id}` body.
///
/// Absent fields stay unchanged; `null` clears `title` or `max_downloads`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[validate(length(min = 1, message = "original_url must not be empty"))]
    pub original_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_downloads: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            title: req.title,
            original_url: req.original_url,
            max_downloads: req.max_downloads,
            is_active: req.is_active,
        }
    }
}

/// `POST /api/users` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserBody {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        CreateUserRequest {
            username: body.username,
            password: body.password,
            role: body.role.unwrap_or(UserRole::User),
        }
    }
}

/// `PUT /api/users/{id}/role` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Present-but-null becomes `Some(None)`; absence is handled by `default`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
