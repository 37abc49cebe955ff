//! Route definitions for the TrackLink HTTP API.
//!
//! The public download route sits at the root; everything else is mounted
//! under `/api`. Admin-only groups are wrapped in the RBAC guard.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// Build the router with all routes, threading `state` to every handler.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(link_routes())
        .merge(user_routes(state.clone()))
        .merge(health_routes());

    Router::new()
        .route("/download/{id}", get(handlers::download::download))
        .nest("/api", api_routes)
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

fn link_routes() -> Router<AppState> {
    use handlers::link;

    Router::new()
        .route("/links", get(link::list_links).post(link::create_link))
        .route("/links/check-all", post(link::check_all_links))
        .route(
            "/links/{id}",
            get(link::get_link)
                .put(link::update_link)
                .delete(link::delete_link),
        )
        .route("/links/{id}/deactivate", post(link::deactivate_link))
        .route("/links/{id}/reset", post(link::reset_downloads))
        .route("/links/{id}/check", post(link::check_link))
        .route("/links/{id}/refresh", post(link::refresh_link))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/users", get(user::list_users).post(user::create_user))
        .route("/users/{id}", axum::routing::delete(user::delete_user))
        .route("/users/{id}/role", put(user::update_role))
        .route_layer(axum_middleware::from_fn_with_state(state, require_admin))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
