//! Participant repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_entity::participant::cohort::Cohort;
use docsync_entity::participant::model::{NewParticipant, Participant, PaymentStatus};

use super::folder::is_unique_violation;

/// Repository for workshop registrants.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: SqlitePool,
}

impl ParticipantRepository {
    /// Create a new participant repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a participant by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find participant", e)
            })
    }

    /// Find a participant by WhatsApp number.
    pub async fn find_by_whatsapp(&self, whatsapp: &str) -> AppResult<Option<Participant>> {
        sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE whatsapp = ?")
            .bind(whatsapp)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find participant by WhatsApp number",
                    e,
                )
            })
    }

    /// List participants, newest registration first, optionally restricted to one cohort.
    pub async fn list(&self, cohort_id: Option<i64>) -> AppResult<Vec<Participant>> {
        sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE (? IS NULL OR cohort_id = ?) \
             ORDER BY registered_at DESC, id DESC",
        )
        .bind(cohort_id)
        .bind(cohort_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list participants", e))
    }

    /// Insert a registration.
    ///
    /// Workshop access and the contact link are copied from `cohort` when present.
    pub async fn create(
        &self,
        data: &NewParticipant,
        cohort: Option<&Cohort>,
        registered_at: DateTime<Utc>,
    ) -> AppResult<Participant> {
        sqlx::query_as::<_, Participant>(
            "INSERT INTO participants \
             (name, whatsapp, email, address, workshop_name, workshop_address, \
              employment_status, reason, cohort_id, workshop_access, document_access, \
              payment_status, contact_link, registered_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.whatsapp)
        .bind(&data.email)
        .bind(&data.address)
        .bind(&data.workshop_name)
        .bind(&data.workshop_address)
        .bind(&data.employment_status)
        .bind(&data.reason)
        .bind(cohort.map(|c| c.id))
        .bind(cohort.is_some_and(|c| c.default_access))
        .bind(PaymentStatus::Unpaid)
        .bind(cohort.map(|c| c.contact_link.clone()))
        .bind(registered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!(
                    "WhatsApp number '{}' is already registered",
                    data.whatsapp
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create participant", e)
            }
        })
    }

    /// Set the participant's own document-access flag.
    ///
    /// `granted_at` replaces the permission timestamp when access is switched on.
    pub async fn set_document_access(
        &self,
        id: i64,
        enabled: bool,
        granted_at: DateTime<Utc>,
    ) -> AppResult<Participant> {
        sqlx::query_as::<_, Participant>(
            "UPDATE participants SET document_access = ?, \
             document_access_granted_at = CASE WHEN ? THEN ? ELSE document_access_granted_at END \
             WHERE id = ? RETURNING *",
        )
        .bind(enabled)
        .bind(enabled)
        .bind(granted_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update document access", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Participant {id} not found")))
    }

    /// Update the payment status.
    pub async fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> AppResult<Participant> {
        sqlx::query_as::<_, Participant>(
            "UPDATE participants SET payment_status = ? WHERE id = ? RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update payment status", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Participant {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;
    use crate::repositories::CohortRepository;
    use chrono::TimeZone;
    use docsync_entity::participant::cohort::NewCohort;

    fn registration(whatsapp: &str) -> NewParticipant {
        NewParticipant {
            name: "Budi".into(),
            whatsapp: whatsapp.into(),
            workshop_name: Some("Budi Motor".into()),
            ..NewParticipant::default()
        }
    }

    #[tokio::test]
    async fn test_create_copies_cohort_defaults() {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        let cohorts = CohortRepository::new(db.pool().clone());
        let repo = ParticipantRepository::new(db.into_pool());
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();

        let cohort = cohorts
            .create(
                &NewCohort {
                    name: "Batch 1".into(),
                    contact_link: "https://chat.whatsapp.com/b1".into(),
                    default_access: true,
                },
                now,
            )
            .await
            .unwrap();

        let p = repo.create(&registration("0811"), Some(&cohort), now).await.unwrap();
        assert_eq!(p.cohort_id, Some(cohort.id));
        assert!(p.workshop_access);
        assert!(!p.document_access);
        assert_eq!(p.payment_status, PaymentStatus::Unpaid);
        assert_eq!(p.contact_link.as_deref(), Some("https://chat.whatsapp.com/b1"));

        let solo = repo.create(&registration("0822"), None, now).await.unwrap();
        assert!(!solo.workshop_access);
        assert!(solo.contact_link.is_none());

        assert_eq!(repo.list(Some(cohort.id)).await.unwrap().len(), 1);
        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_whatsapp("0822").await.unwrap().unwrap().id, solo.id);
    }

    #[tokio::test]
    async fn test_duplicate_whatsapp_is_conflict() {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        let repo = ParticipantRepository::new(db.into_pool());
        repo.create(&registration("0811"), None, Utc::now()).await.unwrap();
        let err = repo.create(&registration("0811"), None, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_document_access_and_payment_updates() {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        let repo = ParticipantRepository::new(db.into_pool());
        let t0 = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        let p = repo.create(&registration("0811"), None, t0).await.unwrap();

        let on = repo.set_document_access(p.id, true, t0).await.unwrap();
        assert!(on.document_access);
        assert_eq!(on.document_access_granted_at, Some(t0));

        let off = repo
            .set_document_access(p.id, false, t0 + chrono::Duration::days(1))
            .await
            .unwrap();
        assert!(!off.document_access);
        assert_eq!(off.document_access_granted_at, Some(t0));

        let paid = repo.set_payment_status(p.id, PaymentStatus::Paid).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let err = repo.set_payment_status(404, PaymentStatus::Paid).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
