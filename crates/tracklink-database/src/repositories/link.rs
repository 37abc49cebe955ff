//! Link repository implementation.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use tracklink_core::error::{AppError, ErrorKind};
use tracklink_core::result::AppResult;
use tracklink_entity::link::{CreateLink, Link, LinkUpdate};

/// Repository for tracking link persistence.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: SqlitePool,
}

impl LinkRepository {
    /// Create a new link repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a link by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Link>> {
        sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find link", e))
    }

    /// List all links, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<Link>> {
        sqlx::query_as::<_, Link>("SELECT * FROM links ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list links", e))
    }

    /// Insert a new link. `expires_at` is fixed here and never recomputed.
    pub async fn create(&self, data: &CreateLink) -> AppResult<Link> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, Link>(
            "INSERT INTO links (id, title, original_url, max_downloads, current_downloads, \
             expiration_hours, created_at, expires_at, is_active) \
             VALUES (?, ?, ?, ?, 0, ?, ?, ?, 1) RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.original_url)
        .bind(data.max_downloads)
        .bind(data.expiration_hours)
        .bind(now)
        .bind(data.expires_at(now))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create link", e))
    }

    /// Atomically add one download and return the new count.
    pub async fn increment_download_count(&self, id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE links SET current_downloads = current_downloads + 1 \
             WHERE id = ? RETURNING current_downloads",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment download count", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Link {id} not found")))
    }

    /// Mark a link inactive. Returns `false` when the link does not exist.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE links SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to deactivate link", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a typed partial update. An empty update succeeds without
    /// touching the database.
    pub async fn update(&self, id: Uuid, update: &LinkUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE links SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &update.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(url) = &update.original_url {
                set.push("original_url = ").push_bind_unseparated(url.clone());
            }
            if let Some(max) = update.max_downloads {
                set.push("max_downloads = ").push_bind_unseparated(max);
            }
            if let Some(current) = update.current_downloads {
                set.push("current_downloads = ").push_bind_unseparated(current);
            }
            if let Some(active) = update.is_active {
                set.push("is_active = ").push_bind_unseparated(active);
            }
            if let Some(valid) = update.is_valid {
                set.push("is_valid = ").push_bind_unseparated(valid);
            }
            if let Some(checked) = update.last_checked {
                set.push("last_checked = ").push_bind_unseparated(checked);
            }
            if let Some(code) = update.status_code {
                set.push("status_code = ").push_bind_unseparated(code);
            }
            if let Some(error) = &update.error {
                set.push("error = ").push_bind_unseparated(error.clone());
            }
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update link", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Link {id} not found")));
        }
        Ok(())
    }

    /// Delete a link. Returns `false` when the link does not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete link", e))?;
        Ok(result.rows_affected() > 0)
    }
}
