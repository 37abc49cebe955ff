//! UUID path parameter that renders malformed ids as JSON 404s.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use tracklink_core::error::AppError;

use crate::error::ApiError;

/// The `{id}` segment of a route, parsed as a UUID.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found("Resource not found"))?;
        Uuid::parse_str(&raw)
            .map(IdPath)
            .map_err(|_| AppError::not_found("Resource not found").into())
    }
}
