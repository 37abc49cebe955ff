//! Shared application state passed to all handlers.

use std::sync::Arc;

use tracklink_auth::{SessionCleanup, SessionManager};
use tracklink_core::config::AppConfig;
use tracklink_database::DatabasePool;
use tracklink_database::repositories::UserRepository;
use tracklink_service::{DownloadOrchestrator, LinkService, UserService};

/// Application state shared across all request handlers via Axum's `State`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ──────────────────────────────────────────
    /// Loaded configuration.
    pub config: Arc<AppConfig>,

    // ── Database ───────────────────────────────────────────────
    /// SQLite pool.
    pub db_pool: DatabasePool,
    /// User lookups for session resolution.
    pub user_repo: Arc<UserRepository>,

    // ── Auth ───────────────────────────────────────────────────
    /// Session issuing and resolution.
    pub session_manager: Arc<SessionManager>,
    /// Sweeps expired sessions from the same store.
    pub session_cleanup: SessionCleanup,

    // ── Services ───────────────────────────────────────────────
    /// Serves `/download/{id}`.
    pub download_orchestrator: Arc<DownloadOrchestrator>,
    /// Link management.
    pub link_service: Arc<LinkService>,
    /// User administration.
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Public tracking URL for a link.
    pub fn download_url(&self, id: uuid::Uuid) -> String {
        format!("{}/download/{id}", self.config.server.base_url())
    }
}
