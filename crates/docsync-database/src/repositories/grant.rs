//! Access grant repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_entity::grant::model::{AccessGrant, GrantTarget};

/// Fields of a validated grant ready to be stored.
#[derive(Debug, Clone)]
pub struct GrantRecord {
    /// Resolved target.
    pub target: GrantTarget,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
    /// Issuer identity.
    pub created_by: Option<String>,
}

/// Repository for document access grants.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: SqlitePool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction on the grant store.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    /// Find a grant by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>("SELECT * FROM access_grants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find grant", e))
    }

    /// Store a new active grant.
    pub async fn create(&self, data: &GrantRecord, now: DateTime<Utc>) -> AppResult<AccessGrant> {
        let (participant_id, cohort_id) = data.target.columns();
        sqlx::query_as::<_, AccessGrant>(
            "INSERT INTO access_grants \
             (kind, participant_id, cohort_id, is_active, starts_at, expires_at, note, \
              created_by, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.target.kind())
        .bind(participant_id)
        .bind(cohort_id)
        .bind(data.starts_at)
        .bind(data.expires_at)
        .bind(&data.note)
        .bind(&data.created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create grant", e))
    }

    /// All grants addressed to one participant, newest first.
    pub async fn find_for_participant(&self, participant_id: i64) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT * FROM access_grants WHERE participant_id = ? \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list participant grants", e)
        })
    }

    /// All grants addressed to one cohort, newest first.
    pub async fn find_for_cohort(&self, cohort_id: i64) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT * FROM access_grants WHERE cohort_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(cohort_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list cohort grants", e)
        })
    }

    /// Active grants addressing a participant directly or through a cohort.
    ///
    /// Expiry is not filtered here; callers evaluate effectiveness against
    /// their own clock.
    pub async fn find_active_for(
        &self,
        participant_id: i64,
        cohort_id: Option<i64>,
    ) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT * FROM access_grants WHERE is_active = 1 \
             AND (participant_id = ? OR (? IS NOT NULL AND cohort_id = ?)) \
             ORDER BY id ASC",
        )
        .bind(participant_id)
        .bind(cohort_id)
        .bind(cohort_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load active grants", e))
    }

    /// Deactivate one grant. Returns the updated row.
    pub async fn deactivate(&self, id: i64, now: DateTime<Utc>) -> AppResult<AccessGrant> {
        sqlx::query_as::<_, AccessGrant>(
            "UPDATE access_grants SET is_active = 0, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke grant", e))?
        .ok_or_else(|| AppError::not_found(format!("Grant {id} not found")))
    }

    /// Deactivate every active grant whose expiry is at or before `now`.
    ///
    /// Only the active flag changes. Returns the IDs of the revoked grants.
    pub async fn deactivate_expired(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE access_grants SET is_active = 0 \
             WHERE is_active = 1 AND expires_at IS NOT NULL AND expires_at <= ? \
             RETURNING id",
        )
        .bind(now)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke expired grants", e)
        })
    }
}
