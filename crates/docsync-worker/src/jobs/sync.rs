//! Catalog synchronization of every configured root.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use docsync_entity::sync_log::SyncStatus;
use docsync_service::SyncService;

use crate::task::{PeriodicTask, TaskError};

/// Mirrors the configured remote roots into the catalog.
#[derive(Debug)]
pub struct CatalogSyncJob {
    /// Sync service
    sync: Arc<SyncService>,
    /// Remote ids of the roots, in configuration order
    root_ids: Vec<String>,
}

impl CatalogSyncJob {
    /// Create a new catalog sync job
    pub fn new(sync: Arc<SyncService>, root_ids: Vec<String>) -> Self {
        Self { sync, root_ids }
    }
}

#[async_trait]
impl PeriodicTask for CatalogSyncJob {
    fn name(&self) -> &str {
        "catalog_sync"
    }

    async fn run(&self) -> Result<Value, TaskError> {
        let logs = self.sync.sync(&self.root_ids).await;

        let mut failed = Vec::new();
        for log in logs.iter().filter(|log| log.status == SyncStatus::Failed) {
            tracing::warn!(
                root = %log.root_remote_id,
                error = log.error_message.as_deref().unwrap_or(""),
                "Root synchronization failed"
            );
            failed.push(log.root_remote_id.as_str());
        }

        let folders_created: i64 = logs.iter().map(|l| l.folders_created).sum();
        let files_created: i64 = logs.iter().map(|l| l.files_created).sum();
        tracing::info!(
            roots = logs.len(),
            failed = failed.len(),
            folders_created,
            files_created,
            "Catalog synchronization finished"
        );

        Ok(serde_json::json!({
            "task": "catalog_sync",
            "roots": logs.len(),
            "failed_roots": failed,
            "folders_created": folders_created,
            "files_created": files_created,
        }))
    }
}
