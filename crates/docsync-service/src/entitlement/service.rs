//! Document access entitlements: the access predicate, grant issuance, and
//! the expiry sweep.

use std::sync::Arc;

use tracing::{debug, error, info};

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_core::traits::Clock;
use docsync_database::repositories::{
    CohortRepository, GrantRecord, GrantRepository, ParticipantRepository,
};
use docsync_entity::grant::{AccessGrant, GrantTarget, NewAccessGrant};

/// Decides who may read the protected documents.
///
/// A participant has access when their own document-access flag is set or
/// when any grant addressed to them or to their cohort is effective now.
/// "Effective" is always computed against the injected [`Clock`], never stored.
#[derive(Debug, Clone)]
pub struct EntitlementService {
    /// Participant repository.
    participant_repo: Arc<ParticipantRepository>,
    /// Cohort repository.
    cohort_repo: Arc<CohortRepository>,
    /// Grant repository.
    grant_repo: Arc<GrantRepository>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl EntitlementService {
    /// Creates a new entitlement service.
    pub fn new(
        participant_repo: Arc<ParticipantRepository>,
        cohort_repo: Arc<CohortRepository>,
        grant_repo: Arc<GrantRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participant_repo,
            cohort_repo,
            grant_repo,
            clock,
        }
    }

    /// Whether the participant may read the protected documents right now.
    pub async fn has_document_access(&self, participant_id: i64) -> AppResult<bool> {
        let participant = self
            .participant_repo
            .find_by_id(participant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Participant {participant_id} not found")))?;

        if participant.document_access {
            return Ok(true);
        }

        let now = self.clock.now();
        let grants = self
            .grant_repo
            .find_active_for(participant.id, participant.cohort_id)
            .await?;
        Ok(grants.iter().any(|g| g.is_effective_at(now)))
    }

    /// Fails with an authorization error unless the participant has access.
    pub async fn ensure_document_access(&self, participant_id: i64) -> AppResult<()> {
        if self.has_document_access(participant_id).await? {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Document access has not been granted or has expired",
            ))
        }
    }

    /// Issue a grant to exactly one participant or cohort.
    ///
    /// The start time defaults to now. The target must exist.
    pub async fn issue_grant(&self, req: NewAccessGrant) -> AppResult<AccessGrant> {
        let now = self.clock.now();
        let target = req.validate(now)?;

        match target {
            GrantTarget::Participant(id) => {
                if self.participant_repo.find_by_id(id).await?.is_none() {
                    return Err(AppError::not_found(format!("Participant {id} not found")));
                }
            }
            GrantTarget::Cohort(id) => {
                if self.cohort_repo.find_by_id(id).await?.is_none() {
                    return Err(AppError::not_found(format!("Cohort {id} not found")));
                }
            }
        }

        let record = GrantRecord {
            target,
            starts_at: req.starts_at.unwrap_or(now),
            expires_at: req.expires_at,
            note: req.note,
            created_by: req.created_by,
        };
        let grant = self.grant_repo.create(&record, now).await?;

        info!(
            grant_id = grant.id,
            kind = %grant.kind,
            participant_id = ?grant.participant_id,
            cohort_id = ?grant.cohort_id,
            expires_at = ?grant.expires_at,
            "Document access granted"
        );
        Ok(grant)
    }

    /// Deactivate one grant.
    pub async fn revoke_grant(&self, grant_id: i64) -> AppResult<AccessGrant> {
        let grant = self.grant_repo.deactivate(grant_id, self.clock.now()).await?;
        info!(grant_id, "Document access revoked");
        Ok(grant)
    }

    /// Grants addressed directly to a participant.
    pub async fn grants_for_participant(&self, participant_id: i64) -> AppResult<Vec<AccessGrant>> {
        self.grant_repo.find_for_participant(participant_id).await
    }

    /// Grants addressed to a cohort.
    pub async fn grants_for_cohort(&self, cohort_id: i64) -> AppResult<Vec<AccessGrant>> {
        self.grant_repo.find_for_cohort(cohort_id).await
    }

    /// Deactivate every active grant whose expiry has passed.
    ///
    /// Runs in a single transaction that touches only the active flag. On
    /// error the transaction is rolled back and the error returned; the next
    /// sweep retries.
    pub async fn revoke_expired(&self) -> AppResult<u64> {
        let now = self.clock.now();
        let mut tx = self.grant_repo.begin().await?;

        let revoked = match self.grant_repo.deactivate_expired(&mut tx, now).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Expired grant sweep failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    error!(error = %rollback, "Rollback of grant sweep failed");
                }
                return Err(e);
            }
        };

        tx.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit expired grant sweep");
            AppError::with_source(ErrorKind::Database, "Failed to commit grant sweep", e)
        })?;

        for grant_id in &revoked {
            debug!(grant_id, "Revoked expired grant");
        }
        info!(count = revoked.len(), "Expired grant sweep complete");
        Ok(revoked.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, t0};
    use chrono::Duration;
    use docsync_entity::participant::{NewCohort, NewParticipant};

    fn service(fx: &Fixture) -> EntitlementService {
        EntitlementService::new(
            fx.participants.clone(),
            fx.cohorts.clone(),
            fx.grants.clone(),
            fx.clock.clone(),
        )
    }

    async fn cohort(fx: &Fixture, name: &str) -> i64 {
        fx.cohorts
            .create(
                &NewCohort {
                    name: name.into(),
                    contact_link: "https://chat.whatsapp.com/x".into(),
                    default_access: false,
                },
                t0(),
            )
            .await
            .unwrap()
            .id
    }

    async fn participant(fx: &Fixture, whatsapp: &str, cohort_id: Option<i64>) -> i64 {
        let cohort = match cohort_id {
            Some(id) => fx.cohorts.find_by_id(id).await.unwrap(),
            None => None,
        };
        fx.participants
            .create(
                &NewParticipant {
                    name: "Rudi".into(),
                    whatsapp: whatsapp.into(),
                    ..NewParticipant::default()
                },
                cohort.as_ref(),
                t0(),
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_no_flag_no_grant_means_no_access() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);
        assert!(!svc.has_document_access(pid).await.unwrap());
        let err = svc.ensure_document_access(pid).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_flag_grants_access_without_grants() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        fx.participants.set_document_access(pid, true, t0()).await.unwrap();
        assert!(service(&fx).has_document_access(pid).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_participant_is_not_found() {
        let fx = Fixture::new().await;
        let err = service(&fx).has_document_access(42).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_individual_grant_boundary() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);
        let expiry = t0() + Duration::days(7);
        svc.issue_grant(NewAccessGrant::for_participant(pid).expiring_at(expiry))
            .await
            .unwrap();

        assert!(svc.has_document_access(pid).await.unwrap());
        fx.clock.set(expiry);
        assert!(svc.has_document_access(pid).await.unwrap());
        fx.clock.set(expiry + Duration::seconds(1));
        assert!(!svc.has_document_access(pid).await.unwrap());
    }

    #[tokio::test]
    async fn test_cohort_grant_reaches_members_only() {
        let fx = Fixture::new().await;
        let batch = cohort(&fx, "Batch 1").await;
        let other = cohort(&fx, "Batch 2").await;
        let member = participant(&fx, "0811", Some(batch)).await;
        let outsider = participant(&fx, "0822", Some(other)).await;
        let loner = participant(&fx, "0833", None).await;

        let svc = service(&fx);
        svc.issue_grant(NewAccessGrant::for_cohort(batch)).await.unwrap();

        assert!(svc.has_document_access(member).await.unwrap());
        assert!(!svc.has_document_access(outsider).await.unwrap());
        assert!(!svc.has_document_access(loner).await.unwrap());
        assert_eq!(svc.grants_for_cohort(batch).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_issue_grant_validation() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);

        let both = NewAccessGrant {
            participant_id: Some(pid),
            cohort_id: Some(1),
            ..NewAccessGrant::default()
        };
        assert_eq!(svc.issue_grant(both).await.unwrap_err().kind, ErrorKind::InvalidGrant);
        assert_eq!(
            svc.issue_grant(NewAccessGrant::default()).await.unwrap_err().kind,
            ErrorKind::InvalidGrant
        );
        assert_eq!(
            svc.issue_grant(NewAccessGrant::for_participant(999)).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            svc.issue_grant(NewAccessGrant::for_cohort(999)).await.unwrap_err().kind,
            ErrorKind::NotFound
        );

        let grant = svc.issue_grant(NewAccessGrant::for_participant(pid)).await.unwrap();
        assert_eq!(grant.starts_at, t0());
        assert_eq!(svc.grants_for_participant(pid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_grant() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);
        let grant = svc.issue_grant(NewAccessGrant::for_participant(pid)).await.unwrap();
        assert!(svc.has_document_access(pid).await.unwrap());

        let revoked = svc.revoke_grant(grant.id).await.unwrap();
        assert!(!revoked.is_active);
        assert!(!svc.has_document_access(pid).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_deactivates_only_expired() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);

        let short = svc
            .issue_grant(NewAccessGrant::for_participant(pid).expiring_at(t0() + Duration::hours(1)))
            .await
            .unwrap();
        let long = svc
            .issue_grant(NewAccessGrant::for_participant(pid).expiring_at(t0() + Duration::days(30)))
            .await
            .unwrap();
        let open = svc.issue_grant(NewAccessGrant::for_participant(pid)).await.unwrap();

        assert_eq!(svc.revoke_expired().await.unwrap(), 0);

        fx.clock.advance(Duration::hours(2));
        assert_eq!(svc.revoke_expired().await.unwrap(), 1);
        assert_eq!(svc.revoke_expired().await.unwrap(), 0);

        let grants = svc.grants_for_participant(pid).await.unwrap();
        let active = |id: i64| grants.iter().find(|g| g.id == id).unwrap().is_active;
        assert!(!active(short.id));
        assert!(active(long.id));
        assert!(active(open.id));

        let swept = grants.iter().find(|g| g.id == short.id).unwrap();
        assert_eq!(swept.updated_at, short.updated_at);
        assert_eq!(swept.expires_at, short.expires_at);
    }

    #[tokio::test]
    async fn test_sweep_agrees_with_predicate() {
        let fx = Fixture::new().await;
        let pid = participant(&fx, "0811", None).await;
        let svc = service(&fx);
        let expiry = t0() + Duration::hours(1);
        svc.issue_grant(NewAccessGrant::for_participant(pid).expiring_at(expiry))
            .await
            .unwrap();

        fx.clock.set(expiry + Duration::seconds(1));
        assert!(!svc.has_document_access(pid).await.unwrap());
        svc.revoke_expired().await.unwrap();
        assert!(!svc.has_document_access(pid).await.unwrap());
    }
}
