//! Session lifecycle: login, logout, token resolution.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use tracing::{info, warn};

use tracklink_core::config::SessionConfig;
use tracklink_core::error::AppError;
use tracklink_database::repositories::UserRepository;
use tracklink_entity::user::User;

use super::store::{SessionData, SessionStore};
use crate::password::PasswordHasher;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Opaque session token.
    pub token: String,
    /// Resolved session.
    pub session: SessionData,
    /// The authenticated user.
    pub user: User,
}

/// Issues and resolves opaque session tokens.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    user_repo: Arc<UserRepository>,
    password_hasher: Arc<PasswordHasher>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<dyn SessionStore>,
        user_repo: Arc<UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            user_repo,
            password_hasher,
            config,
        }
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown users and wrong passwords fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let user = match self.user_repo.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login attempt for unknown user");
                return Err(AppError::authentication("Invalid username or password"));
            }
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::authentication("Invalid username or password"));
        }

        let now = Utc::now();
        let session = SessionData {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: now,
            expires_at: now + Duration::hours(self.config.ttl_hours),
        };
        let token = generate_token();
        self.store.set(&token, session.clone()).await?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginResult {
            token,
            session,
            user,
        })
    }

    /// Close a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        if let Some(session) = self.store.get(token).await? {
            info!(user_id = %session.user_id, "User logged out");
        }
        self.store.delete(token).await?;
        Ok(())
    }

    /// Resolve a token to its live session.
    pub async fn resolve(&self, token: &str) -> Result<SessionData, AppError> {
        self.store
            .get(token)
            .await?
            .ok_or_else(|| AppError::authentication("Session expired or invalid"))
    }

    /// Name of the cookie carrying the token.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }
}

/// 256 random bits, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
