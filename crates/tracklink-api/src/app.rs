//! Application builder: wires repositories, services, router and
//! middleware, and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;
use tracing::info;

use tracklink_auth::{
    MemorySessionStore, PasswordHasher, PasswordValidator, SessionCleanup, SessionManager,
    SessionStore,
};
use tracklink_core::config::AppConfig;
use tracklink_core::error::{AppError, ErrorKind};
use tracklink_database::repositories::{LinkRepository, UserRepository};
use tracklink_database::{DatabasePool, LinkStore};
use tracklink_proxy::{ExtractorRegistry, UpstreamClient};
use tracklink_service::{DownloadOrchestrator, LinkService, UserService};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Construct repositories, auth and services over `db_pool`.
pub fn build_state(config: AppConfig, db_pool: DatabasePool) -> Result<AppState, AppError> {
    // ── Repositories ───────────────────────────────────────────
    let pool = db_pool.pool().clone();
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let link_store: Arc<dyn LinkStore> = Arc::new(LinkRepository::new(pool));

    // ── Auth ───────────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let session_store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let session_cleanup = SessionCleanup::new(Arc::clone(&session_store));
    let session_manager = Arc::new(SessionManager::new(
        session_store,
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        config.session.clone(),
    ));

    // ── Upstream ───────────────────────────────────────────────
    let client = Arc::new(UpstreamClient::new(&config.proxy)?);
    let extractors = Arc::new(ExtractorRegistry::from_config(&config.proxy.landing_page));
    info!(
        extractors = extractors.len(),
        timeout_seconds = config.proxy.timeout_seconds,
        "Upstream client ready"
    );

    // ── Services ───────────────────────────────────────────────
    let download_orchestrator = Arc::new(DownloadOrchestrator::new(
        Arc::clone(&link_store),
        Arc::clone(&client),
        extractors,
    ));
    let link_service = Arc::new(LinkService::new(link_store, client));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repo),
        password_hasher,
        password_validator,
    ));

    Ok(AppState {
        config: Arc::new(config),
        db_pool,
        user_repo,
        session_manager,
        session_cleanup,
        download_orchestrator,
        link_service,
        user_service,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_kb * 1024;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, db_pool: DatabasePool) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let base_url = config.server.base_url();
    let bootstrap = config.auth.clone();
    let sweep_every = Duration::from_secs(config.session.cleanup_interval_minutes.max(1) * 60);

    let state = build_state(config, db_pool.clone())?;

    if let Some(admin) = state.user_service.ensure_bootstrap_admin(&bootstrap).await? {
        info!(username = %admin.username, "Bootstrap admin created");
    }

    let session_cleanup = state.session_cleanup.clone();
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    info!(%addr, %base_url, "TrackLink server listening");
    let session_sweeper = session_cleanup.spawn(sweep_every);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    session_sweeper.abort();
    db_pool.close().await;
    info!("TrackLink server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
