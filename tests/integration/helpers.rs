//! Shared test helpers for integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use docsync_core::config::{AppConfig, RootFolderConfig};
use docsync_core::traits::ManualClock;
use docsync_database::DatabasePool;
use docsync_database::repositories::{
    CohortRepository, FileRepository, FolderRepository, GrantRepository, ParticipantRepository,
    SyncLogRepository,
};
use docsync_drive::InMemoryDrive;
use docsync_service::{CatalogService, EntitlementService, ParticipantService, SyncService};

/// Fully wired application over an in-memory database and remote store
pub struct TestApp {
    /// Application config
    pub config: AppConfig,
    /// Fake remote store
    pub drive: InMemoryDrive,
    /// Settable clock shared by every service
    pub clock: Arc<ManualClock>,
    /// Tree synchronizer
    pub sync: Arc<SyncService>,
    /// Catalog queries
    pub catalog: Arc<CatalogService>,
    /// Entitlements
    pub entitlements: Arc<EntitlementService>,
    /// Participant registration
    pub participants: Arc<ParticipantService>,
}

/// The instant every test clock starts at
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 6, 9, 0, 0).unwrap()
}

impl TestApp {
    /// Create a new test application with two configured roots
    pub async fn new() -> Self {
        let config = AppConfig::from_toml_str(
            r#"
            [drive]
            provider = "memory"

            [[catalog.roots]]
            key = "EBOOKS"
            remote_id = "root-ebooks"
            display_name = "Ebooks"

            [[catalog.roots]]
            key = "MANUALS"
            remote_id = "root-manuals"
            display_name = "Service Manuals"
            "#,
        )
        .expect("Failed to parse test config");

        let pool = DatabasePool::connect_in_memory()
            .await
            .expect("Failed to open test database")
            .into_pool();

        let folders = Arc::new(FolderRepository::new(pool.clone()));
        let files = Arc::new(FileRepository::new(pool.clone()));
        let sync_logs = Arc::new(SyncLogRepository::new(pool.clone()));
        let participant_repo = Arc::new(ParticipantRepository::new(pool.clone()));
        let cohort_repo = Arc::new(CohortRepository::new(pool.clone()));
        let grant_repo = Arc::new(GrantRepository::new(pool));

        let drive = InMemoryDrive::new();
        let clock = Arc::new(ManualClock::new(start_time()));

        let sync = Arc::new(SyncService::new(
            Arc::new(drive.clone()),
            folders.clone(),
            files.clone(),
            sync_logs.clone(),
            clock.clone(),
            config.sync.max_depth,
        ));
        let entitlements = Arc::new(EntitlementService::new(
            participant_repo.clone(),
            cohort_repo.clone(),
            grant_repo,
            clock.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            folders,
            files,
            sync_logs,
            entitlements.clone(),
            config.catalog.roots.clone(),
            config.sync.max_depth,
        ));
        let participants = Arc::new(ParticipantService::new(
            participant_repo,
            cohort_repo,
            clock.clone(),
        ));

        Self {
            config,
            drive,
            clock,
            sync,
            catalog,
            entitlements,
            participants,
        }
    }

    /// Current time on the test clock
    pub fn clock_now(&self) -> DateTime<Utc> {
        use docsync_core::traits::Clock;
        self.clock.now()
    }

    /// Configured roots
    pub fn roots(&self) -> &[RootFolderConfig] {
        &self.config.catalog.roots
    }

    /// Populate both remote roots
    ///
    /// Ebooks/{Engine Basics.pdf, Electrical/{Wiring.pdf}}
    /// Service Manuals/{Honda/{Beat 2020.pdf, Vario/{Vario 125.pdf}}, index.txt}
    pub async fn seed_remote(&self) {
        let d = &self.drive;
        d.add_folder(None, "root-ebooks", "Ebooks").await;
        d.add_file("root-ebooks", "f-basics", "Engine Basics.pdf", "application/pdf")
            .await;
        d.add_folder(Some("root-ebooks"), "d-electrical", "Electrical").await;
        d.add_file("d-electrical", "f-wiring", "Wiring.pdf", "application/pdf")
            .await;

        d.add_folder(None, "root-manuals", "Service Manuals").await;
        d.add_file("root-manuals", "f-index", "index.txt", "text/plain").await;
        d.add_folder(Some("root-manuals"), "d-honda", "Honda").await;
        d.add_file("d-honda", "f-beat", "Beat 2020.pdf", "application/pdf")
            .await;
        d.add_folder(Some("d-honda"), "d-vario", "Vario").await;
        d.add_file("d-vario", "f-vario", "Vario 125.pdf", "application/pdf")
            .await;
    }
}
