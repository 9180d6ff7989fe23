//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use docsync_core::config::RootFolderConfig;
use docsync_core::traits::clock::ManualClock;
use docsync_database::DatabasePool;
use docsync_database::repositories::{
    CohortRepository, FileRepository, FolderRepository, GrantRepository, ParticipantRepository,
    SyncLogRepository,
};
use docsync_drive::InMemoryDrive;

/// Every repository over one in-memory database, plus a fake remote and clock.
pub(crate) struct Fixture {
    pub folders: Arc<FolderRepository>,
    pub files: Arc<FileRepository>,
    pub sync_logs: Arc<SyncLogRepository>,
    pub participants: Arc<ParticipantRepository>,
    pub cohorts: Arc<CohortRepository>,
    pub grants: Arc<GrantRepository>,
    pub drive: InMemoryDrive,
    pub clock: Arc<ManualClock>,
}

/// The instant every fixture clock starts at.
pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        let db = DatabasePool::connect_in_memory().await.unwrap();
        let pool = db.into_pool();
        Self {
            folders: Arc::new(FolderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool.clone())),
            sync_logs: Arc::new(SyncLogRepository::new(pool.clone())),
            participants: Arc::new(ParticipantRepository::new(pool.clone())),
            cohorts: Arc::new(CohortRepository::new(pool.clone())),
            grants: Arc::new(GrantRepository::new(pool)),
            drive: InMemoryDrive::new(),
            clock: Arc::new(ManualClock::new(t0())),
        }
    }
}

/// A configured root with no display name.
pub(crate) fn root(key: &str, remote_id: &str) -> RootFolderConfig {
    RootFolderConfig {
        key: key.to_string(),
        remote_id: remote_id.to_string(),
        display_name: None,
    }
}
