//! Session storage abstraction and the in-process implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tracklink_core::error::AppError;
use tracklink_entity::user::UserRole;

/// What a session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    /// Whether the session is past its absolute lifetime.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token-keyed session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Look up a live session. Expired sessions resolve to `None`.
    async fn get(&self, token: &str) -> Result<Option<SessionData>, AppError>;

    /// Store or replace a session.
    async fn set(&self, token: &str, data: SessionData) -> Result<(), AppError>;

    /// Remove a session. Returns whether one existed.
    async fn delete(&self, token: &str) -> Result<bool, AppError>;

    /// Drop every session expired at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError>;
}

/// Process-local session table. Sessions are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionData>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<Option<SessionData>, AppError> {
        let now = Utc::now();
        let expired = match self.sessions.get(token) {
            Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        Ok(None)
    }

    async fn set(&self, token: &str, data: SessionData) -> Result<(), AppError> {
        self.sessions.insert(token.to_string(), data);
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.sessions.remove(token).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before.saturating_sub(self.sessions.len()))
    }
}
