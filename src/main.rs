//! DocSync daemon: workshop document catalog mirror and access entitlements.
//!
//! Main entry point that wires all crates together and runs the periodic
//! tasks until a shutdown signal arrives.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_core::traits::{Clock, SystemClock};
use docsync_database::DatabasePool;
use docsync_database::repositories::{
    CohortRepository, FileRepository, FolderRepository, GrantRepository, ParticipantRepository,
    SyncLogRepository,
};
use docsync_service::{EntitlementService, SyncService};
use docsync_worker::SyncScheduler;
use docsync_worker::jobs::{CatalogSyncJob, GrantRevocationJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DOCSYNC_ENV").unwrap_or_else(|_| "development".to_string());
    match std::env::var("DOCSYNC_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => AppConfig::load(&env),
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocSync v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    create_database_directory(&config.database.url).await?;
    let db = DatabasePool::connect(&config.database).await?;
    docsync_database::migration::run_migrations(db.pool()).await?;
    let pool = db.pool().clone();

    // ── Step 2: Remote storage client ────────────────────────────
    tracing::info!(provider = %config.drive.provider, "Connecting remote storage client...");
    let remote = docsync_drive::connect(&config.drive).await?;

    // ── Step 3: Repositories ─────────────────────────────────────
    let folder_repo = Arc::new(FolderRepository::new(pool.clone()));
    let file_repo = Arc::new(FileRepository::new(pool.clone()));
    let sync_log_repo = Arc::new(SyncLogRepository::new(pool.clone()));
    let participant_repo = Arc::new(ParticipantRepository::new(pool.clone()));
    let cohort_repo = Arc::new(CohortRepository::new(pool.clone()));
    let grant_repo = Arc::new(GrantRepository::new(pool));

    // ── Step 4: Services ─────────────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sync_service = Arc::new(SyncService::new(
        remote,
        Arc::clone(&folder_repo),
        Arc::clone(&file_repo),
        Arc::clone(&sync_log_repo),
        Arc::clone(&clock),
        config.sync.max_depth,
    ));
    let entitlement_service = Arc::new(EntitlementService::new(
        participant_repo,
        cohort_repo,
        grant_repo,
        Arc::clone(&clock),
    ));
    tracing::info!(roots = config.catalog.roots.len(), "Services initialized");

    // ── Step 5: Scheduler ────────────────────────────────────────
    let mut scheduler = SyncScheduler::new().await?;
    scheduler
        .register(
            Arc::new(CatalogSyncJob::new(
                Arc::clone(&sync_service),
                config.catalog.root_ids(),
            )),
            &config.schedule.sync_cron,
        )
        .await?;
    scheduler
        .register(
            Arc::new(GrantRevocationJob::new(Arc::clone(&entitlement_service))),
            &config.schedule.revocation_cron,
        )
        .await?;

    if config.schedule.sync_on_start {
        tracing::info!("Running initial catalog synchronization");
        scheduler.run_now("catalog_sync").await;
    }

    if config.schedule.enabled {
        scheduler.start().await?;
    } else {
        tracing::info!("Periodic tasks disabled");
    }

    // ── Step 6: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping scheduler...");

    if config.schedule.enabled {
        scheduler.shutdown().await?;
    }
    db.close().await;

    tracing::info!("DocSync shut down gracefully");
    Ok(())
}

/// Create the directory holding a file-backed SQLite database
async fn create_database_directory(url: &str) -> Result<(), AppError> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::internal(format!("Failed to create dir '{}': {}", dir.display(), e))
            })?;
        }
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
