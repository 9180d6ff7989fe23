//! Sync log repository implementation.

use sqlx::SqlitePool;

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_entity::sync_log::model::{NewSyncLog, SyncLog};

/// Repository for the append-only synchronization audit trail.
#[derive(Debug, Clone)]
pub struct SyncLogRepository {
    pool: SqlitePool,
}

impl SyncLogRepository {
    /// Create a new sync log repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a log entry.
    pub async fn create(&self, data: &NewSyncLog) -> AppResult<SyncLog> {
        sqlx::query_as::<_, SyncLog>(
            "INSERT INTO sync_logs \
             (root_remote_id, synced_at, status, folders_created, folders_updated, \
              files_created, files_updated, error_message, duration_seconds) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.root_remote_id)
        .bind(data.synced_at)
        .bind(data.status)
        .bind(data.counts.folders_created)
        .bind(data.counts.folders_updated)
        .bind(data.counts.files_created)
        .bind(data.counts.files_updated)
        .bind(&data.error_message)
        .bind(data.duration_seconds)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write sync log", e))
    }

    /// Most recent entries first.
    pub async fn find_recent(&self, limit: i64) -> AppResult<Vec<SyncLog>> {
        sqlx::query_as::<_, SyncLog>(
            "SELECT * FROM sync_logs ORDER BY synced_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sync logs", e))
    }

    /// Latest entry for one root.
    pub async fn find_latest_for_root(&self, root_remote_id: &str) -> AppResult<Option<SyncLog>> {
        sqlx::query_as::<_, SyncLog>(
            "SELECT * FROM sync_logs WHERE root_remote_id = ? \
             ORDER BY synced_at DESC, id DESC LIMIT 1",
        )
        .bind(root_remote_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find latest sync log", e)
        })
    }
}
