//! Periodic sweep of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use tracklink_core::error::AppError;

use super::store::SessionStore;

/// Removes sessions whose tokens were abandoned without a logout.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    store: Arc<dyn SessionStore>,
}

impl SessionCleanup {
    /// Creates a cleanup handler over `store`.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Runs one cleanup cycle. Returns the number of sessions removed.
    pub async fn run_cleanup(&self) -> Result<usize, AppError> {
        let removed = self.store.purge_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired sessions purged");
        } else {
            debug!("No expired sessions to purge");
        }
        Ok(removed)
    }

    /// Repeats [`run_cleanup`](Self::run_cleanup) every `every` until the
    /// returned handle is aborted.
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Session cleanup failed");
                }
            }
        })
    }
}
