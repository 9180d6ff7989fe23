//! Participant registration and cohort management.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use docsync_core::error::AppError;
use docsync_core::result::AppResult;
use docsync_core::traits::Clock;
use docsync_database::repositories::{CohortRepository, ParticipantRepository};
use docsync_entity::participant::{Cohort, NewCohort, NewParticipant, Participant, PaymentStatus};

/// Registers participants and manages cohorts.
#[derive(Debug, Clone)]
pub struct ParticipantService {
    /// Participant repository.
    participant_repo: Arc<ParticipantRepository>,
    /// Cohort repository.
    cohort_repo: Arc<CohortRepository>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl ParticipantService {
    /// Creates a new participant service.
    pub fn new(
        participant_repo: Arc<ParticipantRepository>,
        cohort_repo: Arc<CohortRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participant_repo,
            cohort_repo,
            clock,
        }
    }

    /// Register a participant.
    ///
    /// The named cohort must exist and be active. Its default access and
    /// contact link are copied onto the new participant.
    pub async fn register(&self, mut data: NewParticipant) -> AppResult<Participant> {
        data.name = data.name.trim().to_string();
        data.whatsapp = data.whatsapp.trim().to_string();
        data.validate()
            .map_err(|e| AppError::validation(format!("Invalid registration: {e}")))?;
        if !data.has_valid_whatsapp() {
            return Err(AppError::validation(
                "WhatsApp number may contain only digits and a leading '+'",
            ));
        }

        if self
            .participant_repo
            .find_by_whatsapp(&data.whatsapp)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "WhatsApp number '{}' is already registered",
                data.whatsapp
            )));
        }

        let cohort = match data.cohort.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let cohort = self
                    .cohort_repo
                    .find_by_name(name)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Cohort '{name}' not found")))?;
                if !cohort.is_active {
                    return Err(AppError::validation(format!(
                        "Cohort '{name}' is closed for registration"
                    )));
                }
                Some(cohort)
            }
            _ => None,
        };

        let participant = self
            .participant_repo
            .create(&data, cohort.as_ref(), self.clock.now())
            .await?;
        info!(
            participant_id = participant.id,
            cohort_id = ?participant.cohort_id,
            "Participant registered"
        );
        Ok(participant)
    }

    /// Get a participant by ID.
    pub async fn get(&self, id: i64) -> AppResult<Participant> {
        self.participant_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Participant {id} not found")))
    }

    /// List participants, optionally restricted to one cohort.
    pub async fn list(&self, cohort_id: Option<i64>) -> AppResult<Vec<Participant>> {
        self.participant_repo.list(cohort_id).await
    }

    /// Switch the participant's own document-access flag.
    pub async fn set_document_access(&self, id: i64, enabled: bool) -> AppResult<Participant> {
        let participant = self
            .participant_repo
            .set_document_access(id, enabled, self.clock.now())
            .await?;
        info!(participant_id = id, enabled, "Participant document access changed");
        Ok(participant)
    }

    /// Record a payment status change.
    pub async fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> AppResult<Participant> {
        let participant = self.participant_repo.set_payment_status(id, status).await?;
        info!(participant_id = id, status = %status, "Payment status changed");
        Ok(participant)
    }

    /// Create a cohort.
    pub async fn create_cohort(&self, mut data: NewCohort) -> AppResult<Cohort> {
        data.name = data.name.trim().to_string();
        if data.name.is_empty() {
            return Err(AppError::validation("Cohort name is required"));
        }
        let cohort = self.cohort_repo.create(&data, self.clock.now()).await?;
        info!(cohort_id = cohort.id, name = %cohort.name, "Cohort created");
        Ok(cohort)
    }

    /// List all cohorts.
    pub async fn list_cohorts(&self) -> AppResult<Vec<Cohort>> {
        self.cohort_repo.list().await
    }
}
