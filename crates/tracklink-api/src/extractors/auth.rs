//! `AuthUser` extractor: resolves the session token from the
//! `Authorization` header or the session cookie and loads the account.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use tracklink_core::error::AppError;
use tracklink_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated panel user available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Who is acting.
    pub context: RequestContext,
    /// The token the request authenticated with.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// Session token carried by a request: bearer header first, then cookie.
pub fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state.session_manager.cookie_name())
            .ok_or_else(|| AppError::authentication("Authentication required"))?;

        let session = state.session_manager.resolve(&token).await?;

        // Role is read from the stored account, not the session.
        let user = state
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Session expired or invalid"))?;

        Ok(AuthUser {
            context: RequestContext::new(user.id, user.username, user.role),
            token,
        })
    }
}
