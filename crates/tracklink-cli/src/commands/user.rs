//! User management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use tracklink_auth::{PasswordHasher, PasswordValidator};
use tracklink_core::config::AppConfig;
use tracklink_core::error::{AppError, ErrorKind};
use tracklink_database::repositories::UserRepository;
use tracklink_entity::user::{User, UserRole};
use tracklink_service::{CreateUserRequest, UserService};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List,
    /// Create a user; the password is prompted for
    Create {
        /// Username
        username: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Delete a user
    Delete {
        /// Username
        username: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    username: String,
    role: String,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            role: u.role.to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::connect(config).await?;
    let user_repo = Arc::new(UserRepository::new(pool.pool().clone()));

    match &args.command {
        UserCommand::List => {
            let users = user_repo.find_all().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Create { username, admin } => {
            let password = dialoguer::Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input error", e))?;

            let service = UserService::new(
                Arc::clone(&user_repo),
                Arc::new(PasswordHasher::new()),
                Arc::new(PasswordValidator::new(&config.auth)),
            );
            let role = if *admin { UserRole::Admin } else { UserRole::User };
            let user = service
                .create_unchecked(CreateUserRequest {
                    username: username.clone(),
                    password,
                    role,
                })
                .await?;

            info!(user_id = %user.id, role = %user.role, "User created from CLI");
            output::print_item(&UserRow::from(&user), format);
            output::print_success(&format!("User '{}' created", user.username));
        }
        UserCommand::Delete { username, force } => {
            let user = user_repo
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete user '{}'?", user.username))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input error", e))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            user_repo.delete(user.id).await?;
            warn!(user_id = %user.id, username = %user.username, "User deleted from CLI");
            output::print_success(&format!("User '{}' deleted", user.username));
        }
    }

    pool.close().await;
    Ok(())
}
