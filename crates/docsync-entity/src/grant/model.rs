//! Access grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docsync_core::error::AppError;

/// Who a grant is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// A single participant.
    Individual,
    /// Every member of a cohort.
    Cohort,
}

impl std::fmt::Display for GrantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Cohort => write!(f, "cohort"),
        }
    }
}

/// The resolved target of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum GrantTarget {
    /// A participant row.
    Participant(i64),
    /// A cohort row.
    Cohort(i64),
}

impl GrantTarget {
    /// Resolve the target from the two nullable columns.
    ///
    /// Exactly one of them must be set.
    pub fn from_columns(
        participant_id: Option<i64>,
        cohort_id: Option<i64>,
    ) -> Result<Self, AppError> {
        match (participant_id, cohort_id) {
            (Some(p), None) => Ok(Self::Participant(p)),
            (None, Some(c)) => Ok(Self::Cohort(c)),
            (Some(_), Some(_)) => Err(AppError::invalid_grant(
                "A grant cannot target both a participant and a cohort",
            )),
            (None, None) => Err(AppError::invalid_grant(
                "A grant must target a participant or a cohort",
            )),
        }
    }

    /// The grant kind implied by this target.
    pub fn kind(&self) -> GrantKind {
        match self {
            Self::Participant(_) => GrantKind::Individual,
            Self::Cohort(_) => GrantKind::Cohort,
        }
    }

    /// `(participant_id, cohort_id)` column values.
    pub fn columns(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            Self::Participant(p) => (Some(p), None),
            Self::Cohort(c) => (None, Some(c)),
        }
    }
}

/// A time-bounded entitlement to the protected documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessGrant {
    /// Row identifier.
    pub id: i64,
    /// Individual or cohort.
    pub kind: GrantKind,
    /// Target participant (individual grants).
    pub participant_id: Option<i64>,
    /// Target cohort (cohort grants).
    pub cohort_id: Option<i64>,
    /// Cleared by revocation or by the expiry sweep.
    pub is_active: bool,
    /// When the grant starts.
    pub starts_at: DateTime<Utc>,
    /// When the grant stops being effective (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
    /// Who issued the grant.
    pub created_by: Option<String>,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last modified.
    pub updated_at: DateTime<Utc>,
}

impl AccessGrant {
    /// Whether the grant is effective at `now`: active and not past expiry.
    ///
    /// The expiry instant itself is still inside the grant.
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now <= expires_at,
            None => true,
        }
    }

    /// The target resolved from the stored columns.
    pub fn target(&self) -> Result<GrantTarget, AppError> {
        GrantTarget::from_columns(self.participant_id, self.cohort_id)
    }
}

/// Grant issuance request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccessGrant {
    /// Target participant.
    pub participant_id: Option<i64>,
    /// Target cohort.
    pub cohort_id: Option<i64>,
    /// Start time (defaults to the issuance time).
    pub starts_at: Option<DateTime<Utc>>,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
    /// Issuer identity.
    pub created_by: Option<String>,
}

impl NewAccessGrant {
    /// An open-ended grant for one participant.
    pub fn for_participant(participant_id: i64) -> Self {
        Self {
            participant_id: Some(participant_id),
            ..Self::default()
        }
    }

    /// An open-ended grant for a whole cohort.
    pub fn for_cohort(cohort_id: i64) -> Self {
        Self {
            cohort_id: Some(cohort_id),
            ..Self::default()
        }
    }

    /// Set the expiry.
    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Validate the request and resolve its target.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<GrantTarget, AppError> {
        let target = GrantTarget::from_columns(self.participant_id, self.cohort_id)?;
        let starts_at = self.starts_at.unwrap_or(now);
        if let Some(expires_at) = self.expires_at {
            if expires_at < starts_at {
                return Err(AppError::invalid_grant(
                    "A grant cannot expire before it starts",
                ));
            }
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use docsync_core::error::ErrorKind;

    fn grant(is_active: bool, expires_at: Option<DateTime<Utc>>) -> AccessGrant {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        AccessGrant {
            id: 1,
            kind: GrantKind::Individual,
            participant_id: Some(7),
            cohort_id: None,
            is_active,
            starts_at: t0,
            expires_at,
            note: None,
            created_by: None,
            created_at: t0,
            updated_at: t0,
        }
    }

    #[test]
    fn test_open_ended_grant_is_always_effective() {
        let g = grant(true, None);
        let far = Utc.with_ymd_and_hms(2099, 12, 31, 23, 59, 59).unwrap();
        assert!(g.is_effective_at(far));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let t = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let g = grant(true, Some(t));
        assert!(g.is_effective_at(t));
        assert!(!g.is_effective_at(t + Duration::seconds(1)));
    }

    #[test]
    fn test_inactive_grant_is_never_effective() {
        let t = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert!(!grant(false, None).is_effective_at(t));
        assert!(!grant(false, Some(t + Duration::days(30))).is_effective_at(t));
    }

    #[test]
    fn test_target_must_be_exactly_one() {
        assert_eq!(
            GrantTarget::from_columns(Some(1), None).unwrap(),
            GrantTarget::Participant(1)
        );
        assert_eq!(
            GrantTarget::from_columns(None, Some(2)).unwrap().kind(),
            GrantKind::Cohort
        );
        assert_eq!(
            GrantTarget::from_columns(Some(1), Some(2)).unwrap_err().kind,
            ErrorKind::InvalidGrant
        );
        assert_eq!(
            GrantTarget::from_columns(None, None).unwrap_err().kind,
            ErrorKind::InvalidGrant
        );
    }

    #[test]
    fn test_validate_rejects_expiry_before_start() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let req = NewAccessGrant::for_participant(3).expiring_at(now - Duration::hours(1));
        assert_eq!(req.validate(now).unwrap_err().kind, ErrorKind::InvalidGrant);

        let ok = NewAccessGrant::for_cohort(4).expiring_at(now + Duration::days(7));
        assert_eq!(ok.validate(now).unwrap(), GrantTarget::Cohort(4));
    }
}
