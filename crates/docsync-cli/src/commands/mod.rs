//! CLI command definitions and dispatch.

pub mod access;
pub mod catalog;
pub mod cohort;
pub mod grant;
pub mod migrate;
pub mod participant;
pub mod sync;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_core::traits::{Clock, SystemClock};
use docsync_database::DatabasePool;
use docsync_database::repositories::{
    CohortRepository, FileRepository, FolderRepository, GrantRepository, ParticipantRepository,
    SyncLogRepository,
};
use docsync_service::{CatalogService, EntitlementService, ParticipantService, SyncService};

/// DocSync: workshop document catalog administration
#[derive(Debug, Parser)]
#[command(name = "docsync", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Mirror remote roots into the catalog
    Sync(sync::SyncArgs),
    /// Deactivate grants whose expiry has passed
    Sweep,
    /// Browse and search the mirrored catalog
    Catalog(catalog::CatalogArgs),
    /// Show recent synchronization runs
    Logs {
        /// Number of runs to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
    /// Issue, list and revoke access grants
    Grant(grant::GrantArgs),
    /// Check document access
    Access(access::AccessArgs),
    /// Participant management
    Participant(participant::ParticipantArgs),
    /// Cohort management
    Cohort(cohort::CohortArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config)?;
        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Sync(args) => sync::execute(args, &config, self.format).await,
            Commands::Sweep => grant::sweep(&config).await,
            Commands::Catalog(args) => catalog::execute(args, &config, self.format).await,
            Commands::Logs { limit } => sync::logs(*limit, &config, self.format).await,
            Commands::Grant(args) => grant::execute(args, &config, self.format).await,
            Commands::Access(args) => access::execute(args, &config, self.format).await,
            Commands::Participant(args) => {
                participant::execute(args, &config, self.format).await
            }
            Commands::Cohort(args) => cohort::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load configuration from file plus environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Repositories and services over one database connection.
///
/// The remote client is not part of this set; only `sync` needs it.
#[derive(Debug, Clone)]
pub struct Services {
    /// Folder repository
    pub folders: Arc<FolderRepository>,
    /// File repository
    pub files: Arc<FileRepository>,
    /// Sync log repository
    pub sync_logs: Arc<SyncLogRepository>,
    /// Wall clock
    pub clock: Arc<dyn Clock>,
    /// Entitlement service
    pub entitlements: Arc<EntitlementService>,
    /// Catalog query service
    pub catalog: Arc<CatalogService>,
    /// Participant service
    pub participants: Arc<ParticipantService>,
}

impl Services {
    /// Connect to the configured database and wire the services.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let pool = db.into_pool();

        let folders = Arc::new(FolderRepository::new(pool.clone()));
        let files = Arc::new(FileRepository::new(pool.clone()));
        let sync_logs = Arc::new(SyncLogRepository::new(pool.clone()));
        let participant_repo = Arc::new(ParticipantRepository::new(pool.clone()));
        let cohort_repo = Arc::new(CohortRepository::new(pool.clone()));
        let grant_repo = Arc::new(GrantRepository::new(pool));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let entitlements = Arc::new(EntitlementService::new(
            participant_repo.clone(),
            cohort_repo.clone(),
            grant_repo,
            clock.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            folders.clone(),
            files.clone(),
            sync_logs.clone(),
            entitlements.clone(),
            config.catalog.roots.clone(),
            config.sync.max_depth,
        ));
        let participants = Arc::new(ParticipantService::new(
            participant_repo,
            cohort_repo,
            clock.clone(),
        ));

        Ok(Self {
            folders,
            files,
            sync_logs,
            clock,
            entitlements,
            catalog,
            participants,
        })
    }

    /// Build a sync service against the configured remote store.
    pub async fn sync_service(&self, config: &AppConfig) -> Result<SyncService, AppError> {
        let remote = docsync_drive::connect(&config.drive).await?;
        Ok(SyncService::new(
            remote,
            self.folders.clone(),
            self.files.clone(),
            self.sync_logs.clone(),
            self.clock.clone(),
            config.sync.max_depth,
        ))
    }
}
