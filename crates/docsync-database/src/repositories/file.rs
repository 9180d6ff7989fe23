//! File repository implementation.

use sqlx::SqlitePool;

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_entity::catalog::views::SearchHit;
use docsync_entity::file::model::{File, NewFile};

use super::folder::is_unique_violation;

/// Repository for mirrored file rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a file by row ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// Find a file by its remote identifier.
    pub async fn find_by_remote_id(&self, remote_id: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE remote_id = ?")
            .bind(remote_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file by remote id", e)
            })
    }

    /// List files in a folder, ordered by name.
    pub async fn find_by_folder(&self, folder_id: i64) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id = ? ORDER BY name ASC, id ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// Insert a file seen for the first time.
    pub async fn create(&self, data: &NewFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
             (remote_id, name, mime_type, folder_id, last_synced_at, view_link, download_link) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.remote_id)
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.folder_id)
        .bind(data.synced_at)
        .bind(&data.view_link)
        .bind(&data.download_link)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("File '{}' already exists", data.remote_id))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create file", e)
            }
        })
    }

    /// Refresh the metadata of an existing file, re-linking it to `data.folder_id`.
    pub async fn refresh(&self, id: i64, data: &NewFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = ?, mime_type = ?, folder_id = ?, last_synced_at = ?, \
             view_link = ?, download_link = ? WHERE id = ? RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.folder_id)
        .bind(data.synced_at)
        .bind(&data.view_link)
        .bind(&data.download_link)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to refresh file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Case-insensitive substring search on file names.
    ///
    /// `%`, `_` and `\` in the term match literally.
    pub async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<SearchHit>> {
        let pattern = format!("%{}%", escape_like(term));
        sqlx::query_as::<_, SearchHit>(
            "SELECT f.remote_id, f.name, f.mime_type, d.path AS folder_path \
             FROM files f INNER JOIN folders d ON d.id = f.folder_id \
             WHERE f.name LIKE ? ESCAPE '\\' \
             ORDER BY f.name ASC, f.id ASC LIMIT ?",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search files", e))
    }

    /// Total number of file rows.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(count as u64)
    }
}

/// Escape LIKE wildcards so the term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
