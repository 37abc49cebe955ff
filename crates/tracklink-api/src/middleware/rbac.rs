//! Role guards for route groups.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Rejects the request with 403 unless the session belongs to an admin.
///
/// Mounted with `axum::middleware::from_fn_with_state` so the session is
/// resolved before any admin handler runs.
pub async fn require_admin(auth: AuthUser, request: Request, next: Next) -> Result<Response, ApiError> {
    auth.require_admin()?;
    Ok(next.run(request).await)
}
