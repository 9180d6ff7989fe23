//! Manual synchronization and sync history commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_entity::sync_log::SyncLog;

use super::Services;

/// Arguments for the sync command
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Configured root keys to sync (default: every configured root)
    #[arg(short, long = "root")]
    pub roots: Vec<String>,

    /// Look a folder up on the remote by name and sync it as a root
    #[arg(long, conflicts_with = "roots")]
    pub folder_name: Option<String>,
}

/// Sync log display row
#[derive(Debug, Serialize, Tabled)]
struct SyncLogRow {
    /// Log ID
    id: i64,
    /// Root remote ID
    root: String,
    /// Run time
    synced_at: String,
    /// Outcome
    status: String,
    /// Folders created / updated
    folders: String,
    /// Files created / updated
    files: String,
    /// Duration
    seconds: String,
    /// Error detail
    error: String,
}

impl From<&SyncLog> for SyncLogRow {
    fn from(log: &SyncLog) -> Self {
        Self {
            id: log.id,
            root: log.root_remote_id.clone(),
            synced_at: log.synced_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: log.status.to_string(),
            folders: format!("{} / {}", log.folders_created, log.folders_updated),
            files: format!("{} / {}", log.files_created, log.files_updated),
            seconds: format!("{:.2}", log.duration_seconds),
            error: output::opt(log.error_message.as_deref()),
        }
    }
}

/// Execute the sync command
pub async fn execute(
    args: &SyncArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let sync = services.sync_service(config).await?;

    let root_ids = if let Some(name) = &args.folder_name {
        let id = sync
            .resolve_root_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No remote folder named '{}'", name)))?;
        vec![id]
    } else if args.roots.is_empty() {
        config.catalog.root_ids()
    } else {
        args.roots
            .iter()
            .map(|key| {
                config
                    .catalog
                    .root_by_key(key)
                    .map(|r| r.remote_id.clone())
                    .ok_or_else(|| AppError::not_found(format!("Root '{}' is not configured", key)))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let logs = sync.sync(&root_ids).await;
    match format {
        OutputFormat::Json => output::print_json(&logs),
        OutputFormat::Table => {
            let rows: Vec<SyncLogRow> = logs.iter().map(SyncLogRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}

/// Show the most recent sync runs
pub async fn logs(limit: i64, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let logs = services.catalog.recent_sync_logs(limit).await?;
    match format {
        OutputFormat::Json => output::print_json(&logs),
        OutputFormat::Table => {
            let rows: Vec<SyncLogRow> = logs.iter().map(SyncLogRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
