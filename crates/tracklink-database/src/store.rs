//! Link persistence seam consumed by the download orchestrator.

use async_trait::async_trait;
use uuid::Uuid;

use tracklink_core::result::AppResult;
use tracklink_entity::link::{CreateLink, Link, LinkUpdate};

use crate::repositories::LinkRepository;

/// Asynchronous link store.
///
/// Every operation reports a database error on underlying I/O failure.
#[async_trait]
pub trait LinkStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new link.
    async fn create_link(&self, data: &CreateLink) -> AppResult<Link>;

    /// Load a link by id.
    async fn get_link(&self, id: Uuid) -> AppResult<Option<Link>>;

    /// Load every link, newest first.
    async fn get_all_links(&self) -> AppResult<Vec<Link>>;

    /// Add one download and return the post-increment count.
    async fn increment_download_count(&self, id: Uuid) -> AppResult<i64>;

    /// Switch a link off. `false` when the link does not exist.
    async fn deactivate_link(&self, id: Uuid) -> AppResult<bool>;

    /// Apply a typed partial update; empty updates succeed as no-ops.
    async fn update_link(&self, id: Uuid, update: &LinkUpdate) -> AppResult<()>;

    /// Remove a link. `false` when the link does not exist.
    async fn delete_link(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn create_link(&self, data: &CreateLink) -> AppResult<Link> {
        self.create(data).await
    }

    async fn get_link(&self, id: Uuid) -> AppResult<Option<Link>> {
        self.find_by_id(id).await
    }

    async fn get_all_links(&self) -> AppResult<Vec<Link>> {
        self.find_all().await
    }

    async fn increment_download_count(&self, id: Uuid) -> AppResult<i64> {
        LinkRepository::increment_download_count(self, id).await
    }

    async fn deactivate_link(&self, id: Uuid) -> AppResult<bool> {
        self.deactivate(id).await
    }

    async fn update_link(&self, id: Uuid, update: &LinkUpdate) -> AppResult<()> {
        self.update(id, update).await
    }

    async fn delete_link(&self, id: Uuid) -> AppResult<bool> {
        self.delete(id).await
    }
}
