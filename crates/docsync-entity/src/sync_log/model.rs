//! Sync log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of a synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The whole root was reconciled.
    Success,
    /// The walk aborted; rows written before the failure remain.
    Failed,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable record of one synchronization run over one root.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncLog {
    /// Row identifier.
    pub id: i64,
    /// Remote identifier of the root that was walked.
    pub root_remote_id: String,
    /// When the run finished.
    pub synced_at: DateTime<Utc>,
    /// Outcome.
    pub status: SyncStatus,
    /// Folders created during the run.
    pub folders_created: i64,
    /// Existing folders refreshed during the run.
    pub folders_updated: i64,
    /// Files created during the run.
    pub files_created: i64,
    /// Existing files refreshed during the run.
    pub files_updated: i64,
    /// Error detail for failed runs.
    pub error_message: Option<String>,
    /// Wall time of the run in seconds.
    pub duration_seconds: f64,
}

impl SyncLog {
    /// Whether the run completed.
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}

/// Running tally of rows touched during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    /// Folders created.
    pub folders_created: i64,
    /// Folders refreshed.
    pub folders_updated: i64,
    /// Files created.
    pub files_created: i64,
    /// Files refreshed.
    pub files_updated: i64,
}

impl std::ops::AddAssign for SyncCounts {
    fn add_assign(&mut self, other: Self) {
        self.folders_created += other.folders_created;
        self.folders_updated += other.folders_updated;
        self.files_created += other.files_created;
        self.files_updated += other.files_updated;
    }
}

/// Data required to append a sync log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSyncLog {
    /// Root that was walked.
    pub root_remote_id: String,
    /// Completion time.
    pub synced_at: DateTime<Utc>,
    /// Outcome.
    pub status: SyncStatus,
    /// Rows touched before completion or failure.
    pub counts: SyncCounts,
    /// Error detail.
    pub error_message: Option<String>,
    /// Wall time in seconds.
    pub duration_seconds: f64,
}
