//! Cohort repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_entity::participant::cohort::{Cohort, NewCohort};

use super::folder::is_unique_violation;

/// Repository for participant cohorts.
#[derive(Debug, Clone)]
pub struct CohortRepository {
    pool: SqlitePool,
}

impl CohortRepository {
    /// Create a new cohort repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a cohort by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Cohort>> {
        sqlx::query_as::<_, Cohort>("SELECT * FROM cohorts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find cohort", e))
    }

    /// Find a cohort by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Cohort>> {
        sqlx::query_as::<_, Cohort>("SELECT * FROM cohorts WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find cohort by name", e)
            })
    }

    /// List all cohorts, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Cohort>> {
        sqlx::query_as::<_, Cohort>("SELECT * FROM cohorts ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list cohorts", e))
    }

    /// Create a cohort.
    pub async fn create(&self, data: &NewCohort, created_at: DateTime<Utc>) -> AppResult<Cohort> {
        sqlx::query_as::<_, Cohort>(
            "INSERT INTO cohorts (name, contact_link, default_access, is_active, created_at) \
             VALUES (?, ?, ?, 1, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.contact_link)
        .bind(data.default_access)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Cohort '{}' already exists", data.name))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create cohort", e)
            }
        })
    }
}
