//! Link management handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use tracklink_entity::link::Link;
use tracklink_service::LinkCheck;

use crate::dto::request::{CreateLinkRequest, UpdateLinkRequest};
use crate::dto::response::{ApiResponse, LinkResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::state::AppState;

fn render(state: &AppState, link: Link) -> LinkResponse {
    let url = state.download_url(link.id);
    LinkResponse::from_link(link, url, Utc::now())
}

/// GET /api/links
pub async fn list_links(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<LinkResponse>>>, ApiError> {
    let links = state.link_service.list(&auth).await?;
    let body = links.into_iter().map(|l| render(&state, l)).collect();
    Ok(Json(ApiResponse::ok(body)))
}

/// POST /api/links
pub async fn create_link(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LinkResponse>>), ApiError> {
    let link = state.link_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(render(&state, link)))))
}

/// GET /api/links/{id}
pub async fn get_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.link_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(render(&state, link))))
}

/// PUT /api/links/{id}
pub async fn update_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateLinkRequest>,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.link_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(render(&state, link))))
}

/// DELETE /api/links/{id}
pub async fn delete_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.link_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Link deleted"))))
}

/// POST /api/links/{id}/deactivate
pub async fn deactivate_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.link_service.deactivate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(render(&state, link))))
}

/// POST /api/links/{id}/reset
pub async fn reset_downloads(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.link_service.reset_downloads(&auth, id).await?;
    Ok(Json(ApiResponse::ok(render(&state, link))))
}

/// POST /api/links/{id}/check
pub async fn check_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LinkCheck>>, ApiError> {
    let check = state.link_service.check(&auth, id).await?;
    Ok(Json(ApiResponse::ok(check)))
}

/// POST /api/links/{id}/refresh
pub async fn refresh_link(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LinkResponse>>, ApiError> {
    let link = state.link_service.refresh(&auth, id).await?;
    Ok(Json(ApiResponse::ok(render(&state, link))))
}

/// POST /api/links/check-all
pub async fn check_all_links(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<LinkCheck>>>, ApiError> {
    let checks = state.link_service.check_all(&auth).await?;
    Ok(Json(ApiResponse::ok(checks)))
}
