//! Remote-to-local tree synchronization.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use docsync_core::error::AppError;
use docsync_core::result::AppResult;
use docsync_core::traits::{Clock, RemoteItem, RemoteStorageClient};
use docsync_database::repositories::{FileRepository, FolderRepository, SyncLogRepository};
use docsync_entity::file::NewFile;
use docsync_entity::folder::{Folder, NewFolder, model::child_path};
use docsync_entity::sync_log::{NewSyncLog, SyncCounts, SyncLog, SyncStatus};

/// A folder waiting to be walked.
#[derive(Debug)]
struct PendingFolder {
    /// Remote identifier.
    remote_id: String,
    /// Name from the parent's listing; roots look theirs up.
    name: Option<String>,
    /// Local parent row and its path (None for the root).
    parent: Option<(i64, String)>,
    /// Levels below the root.
    depth: usize,
}

/// Mirrors remote folder trees into the catalog store.
///
/// Every upsert is committed on its own; no transaction spans a remote call.
/// A failure aborts the current root only and is recorded as a failed
/// [`SyncLog`]; rows written before the failure stay.
#[derive(Debug, Clone)]
pub struct SyncService {
    /// Remote storage client.
    remote: Arc<dyn RemoteStorageClient>,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Sync log repository.
    sync_log_repo: Arc<SyncLogRepository>,
    /// Time source for sync stamps.
    clock: Arc<dyn Clock>,
    /// Deepest level below a root that is walked.
    max_depth: usize,
}

impl SyncService {
    /// Creates a new sync service.
    pub fn new(
        remote: Arc<dyn RemoteStorageClient>,
        folder_repo: Arc<FolderRepository>,
        file_repo: Arc<FileRepository>,
        sync_log_repo: Arc<SyncLogRepository>,
        clock: Arc<dyn Clock>,
        max_depth: usize,
    ) -> Self {
        Self {
            remote,
            folder_repo,
            file_repo,
            sync_log_repo,
            clock,
            max_depth,
        }
    }

    /// Synchronizes each root independently and returns one log per root.
    ///
    /// A root whose log cannot be written is reported and skipped; the
    /// remaining roots still run.
    pub async fn sync(&self, root_ids: &[String]) -> Vec<SyncLog> {
        let mut logs = Vec::with_capacity(root_ids.len());
        for root_id in root_ids {
            match self.sync_root(root_id).await {
                Ok(log) => logs.push(log),
                Err(e) => error!(root = %root_id, error = %e, "Failed to record sync result"),
            }
        }
        logs
    }

    /// Synchronizes one rooted subtree.
    ///
    /// Walk errors never surface here: they produce a failed [`SyncLog`].
    /// The only error returned is a failure to write that log.
    pub async fn sync_root(&self, root_id: &str) -> AppResult<SyncLog> {
        let started = Instant::now();
        let mut counts = SyncCounts::default();
        info!(root = root_id, "Starting tree sync");

        let outcome = self.walk(root_id, &mut counts).await;
        let duration_seconds = started.elapsed().as_secs_f64();

        let (status, error_message) = match outcome {
            Ok(()) => {
                info!(
                    root = root_id,
                    folders_created = counts.folders_created,
                    folders_updated = counts.folders_updated,
                    files_created = counts.files_created,
                    files_updated = counts.files_updated,
                    duration_seconds,
                    "Tree sync completed"
                );
                (SyncStatus::Success, None)
            }
            Err(e) => {
                error!(
                    root = root_id,
                    error = %e,
                    folders_created = counts.folders_created,
                    files_created = counts.files_created,
                    duration_seconds,
                    "Tree sync failed"
                );
                (SyncStatus::Failed, Some(e.to_string()))
            }
        };

        self.sync_log_repo
            .create(&NewSyncLog {
                root_remote_id: root_id.to_string(),
                synced_at: self.clock.now(),
                status,
                counts,
                error_message,
                duration_seconds,
            })
            .await
    }

    /// Looks up a remote folder identifier by exact folder name.
    pub async fn resolve_root_by_name(&self, name: &str) -> AppResult<Option<String>> {
        self.remote.find_folder_by_name(name).await
    }

    /// Depth-first walk over an explicit stack.
    async fn walk(&self, root_id: &str, counts: &mut SyncCounts) -> AppResult<()> {
        let mut stack = vec![PendingFolder {
            remote_id: root_id.to_string(),
            name: None,
            parent: None,
            depth: 0,
        }];
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(pending) = stack.pop() {
            if !visited.insert(pending.remote_id.clone()) {
                warn!(
                    root = root_id,
                    folder = %pending.remote_id,
                    "Folder reached twice in one walk, skipping"
                );
                continue;
            }
            if pending.depth > self.max_depth {
                return Err(AppError::validation(format!(
                    "Folder {} is nested deeper than {} levels",
                    pending.remote_id, self.max_depth
                )));
            }

            let name = match pending.name {
                Some(name) => name,
                None => self.remote.get_metadata(&pending.remote_id).await?.name,
            };
            let folder = self
                .upsert_folder(&pending.remote_id, &name, pending.parent, counts)
                .await?;

            let children = self.remote.list_children(&folder.remote_id).await?;
            let mut subfolders = Vec::new();
            for item in children {
                if item.is_folder() {
                    subfolders.push(item);
                } else {
                    self.upsert_file(&item, folder.id, counts).await?;
                }
            }

            // Reversed so the first listed sub-folder is walked first.
            for item in subfolders.into_iter().rev() {
                stack.push(PendingFolder {
                    remote_id: item.id,
                    name: Some(item.name),
                    parent: Some((folder.id, folder.path.clone())),
                    depth: pending.depth + 1,
                });
            }
        }

        Ok(())
    }

    async fn upsert_folder(
        &self,
        remote_id: &str,
        name: &str,
        parent: Option<(i64, String)>,
        counts: &mut SyncCounts,
    ) -> AppResult<Folder> {
        let (parent_id, parent_path) = match parent {
            Some((id, path)) => (Some(id), path),
            None => (None, String::new()),
        };
        let data = NewFolder {
            remote_id: remote_id.to_string(),
            name: name.to_string(),
            parent_id,
            path: child_path(&parent_path, name),
            synced_at: self.clock.now(),
        };

        match self.folder_repo.find_by_remote_id(remote_id).await? {
            Some(existing) => {
                let folder = self.folder_repo.refresh(existing.id, &data).await?;
                counts.folders_updated += 1;
                Ok(folder)
            }
            None => {
                let folder = self.folder_repo.create(&data).await?;
                counts.folders_created += 1;
                Ok(folder)
            }
        }
    }

    async fn upsert_file(
        &self,
        item: &RemoteItem,
        folder_id: i64,
        counts: &mut SyncCounts,
    ) -> AppResult<()> {
        let data = NewFile {
            remote_id: item.id.clone(),
            name: item.name.clone(),
            mime_type: item
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            folder_id,
            view_link: item.view_link.clone(),
            download_link: item.download_link.clone(),
            synced_at: self.clock.now(),
        };

        match self.file_repo.find_by_remote_id(&item.id).await? {
            Some(existing) => {
                self.file_repo.refresh(existing.id, &data).await?;
                counts.files_updated += 1;
            }
            None => {
                self.file_repo.create(&data).await?;
                counts.files_created += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use chrono::Duration;

    fn service(fx: &Fixture, max_depth: usize) -> SyncService {
        SyncService::new(
            Arc::new(fx.drive.clone()),
            fx.folders.clone(),
            fx.files.clone(),
            fx.sync_logs.clone(),
            fx.clock.clone(),
            max_depth,
        )
    }

    /// EBOOKS/{intro.pdf, Engine/{pistons.pdf, Fuel/{injector.pdf}}}
    async fn seed(fx: &Fixture) {
        fx.drive.add_folder(None, "root", "EBOOKS").await;
        fx.drive.add_file("root", "f-intro", "intro.pdf", "application/pdf").await;
        fx.drive.add_folder(Some("root"), "engine", "Engine").await;
        fx.drive.add_file("engine", "f-pistons", "pistons.pdf", "application/pdf").await;
        fx.drive.add_folder(Some("engine"), "fuel", "Fuel").await;
        fx.drive.add_file("fuel", "f-injector", "injector.pdf", "application/pdf").await;
    }

    #[tokio::test]
    async fn test_first_sync_mirrors_tree() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let log = service(&fx, 32).sync_root("root").await.unwrap();

        assert!(log.is_success());
        assert_eq!(log.root_remote_id, "root");
        assert_eq!(log.folders_created, 3);
        assert_eq!(log.files_created, 3);
        assert_eq!(log.folders_updated, 0);

        let fuel = fx.folders.find_by_remote_id("fuel").await.unwrap().unwrap();
        assert_eq!(fuel.path, "/EBOOKS/Engine/Fuel");
        let engine = fx.folders.find_by_id(fuel.parent_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(engine.remote_id, "engine");

        let injector = fx.files.find_by_remote_id("f-injector").await.unwrap().unwrap();
        assert_eq!(injector.folder_id, fuel.id);
        assert!(injector.view_link.is_some());
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let svc = service(&fx, 32);
        svc.sync_root("root").await.unwrap();
        let before = fx.folders.find_by_remote_id("engine").await.unwrap().unwrap();

        fx.clock.advance(Duration::hours(6));
        let log = svc.sync_root("root").await.unwrap();

        assert_eq!(log.folders_created, 0);
        assert_eq!(log.files_created, 0);
        assert_eq!(log.folders_updated, 3);
        assert_eq!(log.files_updated, 3);
        assert_eq!(fx.folders.count().await.unwrap(), 3);
        assert_eq!(fx.files.count().await.unwrap(), 3);

        let after = fx.folders.find_by_remote_id("engine").await.unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.last_synced_at, before.last_synced_at + Duration::hours(6));
    }

    #[tokio::test]
    async fn test_rename_and_move_keep_row_identity() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let svc = service(&fx, 32);
        svc.sync_root("root").await.unwrap();
        let pistons = fx.files.find_by_remote_id("f-pistons").await.unwrap().unwrap();

        fx.drive.rename("engine", "Motor").await;
        fx.drive.move_to("f-pistons", "fuel").await;
        fx.drive.rename("f-pistons", "piston-rings.pdf").await;
        svc.sync_root("root").await.unwrap();

        let fuel = fx.folders.find_by_remote_id("fuel").await.unwrap().unwrap();
        assert_eq!(fuel.path, "/EBOOKS/Motor/Fuel");
        let moved = fx.files.find_by_remote_id("f-pistons").await.unwrap().unwrap();
        assert_eq!(moved.id, pistons.id);
        assert_eq!(moved.name, "piston-rings.pdf");
        assert_eq!(moved.folder_id, fuel.id);
    }

    #[tokio::test]
    async fn test_removed_remote_entries_stay_in_store() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let svc = service(&fx, 32);
        svc.sync_root("root").await.unwrap();

        fx.drive.remove("f-intro").await;
        let log = svc.sync_root("root").await.unwrap();
        assert!(log.is_success());
        assert!(fx.files.find_by_remote_id("f-intro").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_committed_rows() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        fx.drive.fail_on("fuel").await;

        let log = service(&fx, 32).sync_root("root").await.unwrap();
        assert_eq!(log.status, SyncStatus::Failed);
        assert!(log.error_message.unwrap().contains("REMOTE_FETCH"));
        assert_eq!(log.folders_created, 3);
        assert_eq!(log.files_created, 2);
        assert!(fx.files.find_by_remote_id("f-pistons").await.unwrap().is_some());
        assert!(fx.files.find_by_remote_id("f-injector").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_root_logs_failure() {
        let fx = Fixture::new().await;
        let log = service(&fx, 32).sync_root("ghost").await.unwrap();
        assert_eq!(log.status, SyncStatus::Failed);
        assert!(log.error_message.unwrap().contains("REMOTE_NOT_FOUND"));
        assert_eq!(fx.folders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_roots_are_isolated() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        fx.drive.add_folder(None, "other", "Pengetahuan").await;
        fx.drive.add_file("other", "f-other", "basics.pdf", "application/pdf").await;
        fx.drive.fail_on("root").await;

        let logs = service(&fx, 32)
            .sync(&["root".to_string(), "other".to_string()])
            .await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, SyncStatus::Failed);
        assert!(logs[1].is_success());
        assert!(fx.files.find_by_remote_id("f-other").await.unwrap().is_some());
        assert_eq!(fx.sync_logs.find_recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_depth_guard_aborts_root() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let log = service(&fx, 1).sync_root("root").await.unwrap();
        assert_eq!(log.status, SyncStatus::Failed);
        assert!(log.error_message.unwrap().contains("deeper than 1"));
        assert!(fx.folders.find_by_remote_id("engine").await.unwrap().is_some());
        assert!(fx.folders.find_by_remote_id("fuel").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cycle_is_skipped() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        // The root becomes a child of its own grandchild.
        fx.drive.move_to("root", "fuel").await;

        let log = service(&fx, 32).sync_root("root").await.unwrap();
        assert!(log.is_success(), "{:?}", log.error_message);
        assert_eq!(fx.folders.count().await.unwrap(), 3);
        let root = fx.folders.find_by_remote_id("root").await.unwrap().unwrap();
        assert!(root.is_root());
    }

    #[tokio::test]
    async fn test_resolve_root_by_name() {
        let fx = Fixture::new().await;
        seed(&fx).await;
        let svc = service(&fx, 32);
        assert_eq!(svc.resolve_root_by_name("Engine").await.unwrap().as_deref(), Some("engine"));
        assert!(svc.resolve_root_by_name("Dokumen Bengkel").await.unwrap().is_none());
    }
}
