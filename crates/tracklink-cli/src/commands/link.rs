//! Tracking link CLI commands.

use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;
use uuid::Uuid;

use tracklink_core::config::AppConfig;
use tracklink_core::error::AppError;
use tracklink_database::LinkStore;
use tracklink_database::repositories::LinkRepository;
use tracklink_entity::link::Link;
use tracklink_proxy::UpstreamClient;
use tracklink_service::{LinkCheck, LinkService};

use crate::output::{self, OutputFormat, or_dash};

/// Arguments for link commands
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Link subcommand
    #[command(subcommand)]
    pub command: LinkCommand,
}

/// Link subcommands
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// List all links, newest first
    List,
    /// Probe a link's source URL and record the result
    Check {
        /// Link ID
        id: Uuid,
    },
    /// Switch a link off
    Deactivate {
        /// Link ID
        id: Uuid,
    },
    /// Zero the download counter and reactivate unless expired
    Reset {
        /// Link ID
        id: Uuid,
    },
}

/// Link display row for table output
#[derive(Debug, Serialize, Tabled)]
struct LinkRow {
    id: String,
    title: String,
    status: String,
    downloads: String,
    expires_at: String,
    original_url: String,
}

impl From<&Link> for LinkRow {
    fn from(l: &Link) -> Self {
        let downloads = match l.max_downloads {
            Some(max) => format!("{}/{}", l.current_downloads, max),
            None => l.current_downloads.to_string(),
        };
        Self {
            id: l.id.to_string(),
            title: or_dash(l.title.as_deref()),
            status: l.status_at(Utc::now()).to_string(),
            downloads,
            expires_at: or_dash(l.expires_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
            original_url: l.original_url.clone(),
        }
    }
}

/// Probe result row for table output
#[derive(Debug, Serialize, Tabled)]
struct CheckRow {
    link_id: String,
    valid: bool,
    status_code: String,
    error: String,
}

impl From<&LinkCheck> for CheckRow {
    fn from(c: &LinkCheck) -> Self {
        Self {
            link_id: c.link_id.to_string(),
            valid: c.is_valid,
            status_code: or_dash(c.status_code),
            error: or_dash(c.error.as_deref()),
        }
    }
}

/// Execute link commands
pub async fn execute(
    args: &LinkArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::connect(config).await?;
    let store: Arc<dyn LinkStore> = Arc::new(LinkRepository::new(pool.pool().clone()));
    let client = Arc::new(UpstreamClient::new(&config.proxy)?);
    let service = LinkService::new(store, client);
    let ctx = super::operator_context();

    match &args.command {
        LinkCommand::List => {
            let links = service.list(&ctx).await?;
            let rows: Vec<LinkRow> = links.iter().map(LinkRow::from).collect();
            output::print_list(&rows, format);
        }
        LinkCommand::Check { id } => {
            let check = service.check(&ctx, *id).await?;
            output::print_item(&CheckRow::from(&check), format);
        }
        LinkCommand::Deactivate { id } => {
            let link = service.deactivate(&ctx, *id).await?;
            info!(link_id = %id, actor = %ctx.username, "Link deactivated from CLI");
            output::print_item(&LinkRow::from(&link), format);
            output::print_success(&format!("Link {id} deactivated"));
        }
        LinkCommand::Reset { id } => {
            let link = service.reset_downloads(&ctx, *id).await?;
            info!(link_id = %id, actor = %ctx.username, "Download counter reset from CLI");
            output::print_item(&LinkRow::from(&link), format);
            output::print_success(&format!("Link {id} download counter reset"));
        }
    }

    pool.close().await;
    Ok(())
}
