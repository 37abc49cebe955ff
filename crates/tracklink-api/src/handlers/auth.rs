//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let result = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    let cookie = Cookie::build((
        state.session_manager.cookie_name().to_owned(),
        result.token.clone(),
    ))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build();

    let body = LoginResponse {
        token: result.token,
        expires_at: result.session.expires_at,
        user: UserResponse::from(result.user),
    };

    Ok((jar.add(cookie), Json(ApiResponse::ok(body))))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    state.session_manager.logout(&auth.token).await?;

    let removal = Cookie::build(state.session_manager.cookie_name().to_owned()).path("/");

    Ok((
        jar.remove(removal),
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.current(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
