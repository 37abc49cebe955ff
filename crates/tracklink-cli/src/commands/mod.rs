//! CLI command definitions and dispatch.

pub mod link;
pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use tracklink_core::config::AppConfig;
use tracklink_core::error::AppError;
use tracklink_database::DatabasePool;
use tracklink_entity::user::UserRole;
use tracklink_service::RequestContext;

use crate::output::OutputFormat;

/// TrackLink: tracking-link download proxy administration
#[derive(Debug, Parser)]
#[command(name = "tracklink", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Panel user management
    User(user::UserArgs),
    /// Tracking link management
    Link(link::LinkArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Link(args) => link::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: open the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Acting identity for operator commands run from a shell.
pub fn operator_context() -> RequestContext {
    RequestContext::new(Uuid::nil(), "cli".to_string(), UserRole::Admin)
}
