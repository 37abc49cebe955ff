//! User management: admin CRUD, role changes and first-start bootstrap.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tracklink_auth::password::{PasswordHasher, PasswordValidator};
use tracklink_core::config::AuthConfig;
use tracklink_core::error::AppError;
use tracklink_database::repositories::UserRepository;
use tracklink_entity::user::{CreateUser, User, UserRole};

use crate::context::RequestContext;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 64;

/// Request to create a new user.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateUserRequest {
    /// Username (unique, case-insensitive).
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Role assignment; defaults to `user`.
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Handles user administration.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
        }
    }

    /// The caller's own account.
    pub async fn current(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.find(ctx.user_id).await
    }

    /// Lists all users.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        ctx.require_admin()?;
        self.user_repo.find_all().await
    }

    /// Creates a new user.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<User, AppError> {
        ctx.require_admin()?;
        let user = self.create_unchecked(req).await?;
        info!(
            admin_id = %ctx.user_id,
            user_id = %user.id,
            role = %user.role,
            "User created by admin"
        );
        Ok(user)
    }

    /// Deletes a user. Admins cannot delete themselves.
    pub async fn delete(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        ctx.require_admin()?;
        if ctx.user_id == user_id {
            return Err(AppError::validation("You cannot delete your own account"));
        }
        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(admin_id = %ctx.user_id, target_id = %user_id, "User deleted");
        Ok(())
    }

    /// Changes a user's role. Admins cannot demote themselves.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        ctx.require_admin()?;
        if ctx.user_id == user_id && !role.is_admin() {
            return Err(AppError::validation("You cannot remove your own admin role"));
        }
        self.user_repo.update_role(user_id, role).await?;
        info!(admin_id = %ctx.user_id, target_id = %user_id, role = %role, "User role changed");
        self.find(user_id).await
    }

    /// Create the configured admin when no user exists yet.
    pub async fn ensure_bootstrap_admin(&self, config: &AuthConfig) -> Result<Option<User>, AppError> {
        let Some((username, password)) = config.bootstrap_credentials() else {
            return Ok(None);
        };
        if self.user_repo.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create_unchecked(CreateUserRequest {
                username: username.to_string(),
                password: password.to_string(),
                role: UserRole::Admin,
            })
            .await?;
        info!(user_id = %user.id, username = %user.username, "Bootstrap admin created");
        Ok(Some(user))
    }

    /// Create without an actor; used by the CLI and bootstrap.
    pub async fn create_unchecked(&self, req: CreateUserRequest) -> Result<User, AppError> {
        let username = req.username.trim().to_string();
        validate_username(&username)?;
        self.validator.validate(&req.password)?;

        let password_hash = self.hasher.hash_password(&req.password)?;
        self.user_repo
            .create(&CreateUser {
                username,
                password_hash,
                role: req.role,
            })
            .await
    }

    async fn find(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    Ok(())
}
