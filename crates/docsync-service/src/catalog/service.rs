//! Catalog browsing and search over the mirrored tree.

use std::sync::Arc;

use tracing::debug;

use docsync_core::config::RootFolderConfig;
use docsync_core::result::AppResult;
use docsync_database::repositories::{FileRepository, FolderRepository, SyncLogRepository};
use docsync_entity::catalog::{
    CatalogItem, FileInfo, FolderContents, RootCatalog, RootSummary, SearchHit,
};
use docsync_entity::sync_log::SyncLog;

use super::tree::build_tree;
use crate::entitlement::EntitlementService;

/// Search terms shorter than this return nothing.
const MIN_SEARCH_LEN: usize = 2;

/// Maximum number of search hits returned.
const SEARCH_LIMIT: i64 = 50;

/// Renders the persisted catalog for presentation.
///
/// Roots are reported in configuration order; roots that have never been
/// synchronized are left out rather than reported empty.
#[derive(Debug, Clone)]
pub struct CatalogService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Sync log repository.
    sync_log_repo: Arc<SyncLogRepository>,
    /// Gate for participant-facing views.
    entitlements: Arc<EntitlementService>,
    /// Configured roots, in display order.
    roots: Vec<RootFolderConfig>,
    /// Deepest level rendered below a root.
    max_depth: usize,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        file_repo: Arc<FileRepository>,
        sync_log_repo: Arc<SyncLogRepository>,
        entitlements: Arc<EntitlementService>,
        roots: Vec<RootFolderConfig>,
        max_depth: usize,
    ) -> Self {
        Self {
            folder_repo,
            file_repo,
            sync_log_repo,
            entitlements,
            roots,
            max_depth,
        }
    }

    /// Full tree of every stored root, sorted by name at every level.
    pub async fn catalog(&self) -> AppResult<Vec<RootCatalog>> {
        let mut catalogs = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let Some(folder) = self.folder_repo.find_by_remote_id(&root.remote_id).await? else {
                debug!(root = %root.key, "Root not synchronized yet, omitted from catalog");
                continue;
            };
            let tree =
                build_tree(&self.folder_repo, &self.file_repo, &folder, self.max_depth).await?;
            catalogs.push(RootCatalog {
                key: root.key.clone(),
                display_name: root.display_name().to_string(),
                tree,
            });
        }
        Ok(catalogs)
    }

    /// The catalog as seen by one participant.
    ///
    /// Fails with an authorization error when the participant currently has
    /// no document access.
    pub async fn catalog_for(&self, participant_id: i64) -> AppResult<Vec<RootCatalog>> {
        self.entitlements
            .ensure_document_access(participant_id)
            .await?;
        self.catalog().await
    }

    /// One line per stored root with its direct file count.
    pub async fn roots_summary(&self) -> AppResult<Vec<RootSummary>> {
        let mut summaries = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let Some(folder) = self.folder_repo.find_by_remote_id(&root.remote_id).await? else {
                continue;
            };
            summaries.push(RootSummary {
                key: root.key.clone(),
                display_name: root.display_name().to_string(),
                remote_id: folder.remote_id,
                file_count: self.folder_repo.count_files(folder.id).await?,
            });
        }
        Ok(summaries)
    }

    /// Immediate children of a folder: sub-folders first, then files.
    pub async fn folder_contents(&self, remote_id: &str) -> AppResult<Option<FolderContents>> {
        let Some(folder) = self.folder_repo.find_by_remote_id(remote_id).await? else {
            return Ok(None);
        };

        let subfolders = self.folder_repo.find_children(folder.id).await?;
        let files = self.file_repo.find_by_folder(folder.id).await?;

        let items = subfolders
            .into_iter()
            .map(CatalogItem::from)
            .chain(files.into_iter().map(CatalogItem::from))
            .collect();

        Ok(Some(FolderContents {
            name: folder.name,
            items,
        }))
    }

    /// Details of one file, including the remote id of its folder.
    pub async fn file_info(&self, remote_id: &str) -> AppResult<Option<FileInfo>> {
        let Some(file) = self.file_repo.find_by_remote_id(remote_id).await? else {
            return Ok(None);
        };
        let folder = self.folder_repo.find_by_id(file.folder_id).await?;

        Ok(Some(FileInfo {
            remote_id: file.remote_id,
            name: file.name,
            mime_type: file.mime_type,
            folder_remote_id: folder.map(|f| f.remote_id),
            view_link: file.view_link,
            download_link: file.download_link,
        }))
    }

    /// File details for one participant, behind the access check.
    pub async fn file_info_for(
        &self,
        participant_id: i64,
        remote_id: &str,
    ) -> AppResult<Option<FileInfo>> {
        self.entitlements
            .ensure_document_access(participant_id)
            .await?;
        self.file_info(remote_id).await
    }

    /// Case-insensitive name search across all files.
    ///
    /// Terms shorter than two characters after trimming return nothing
    /// without touching the store.
    pub async fn search(&self, term: &str) -> AppResult<Vec<SearchHit>> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        self.file_repo.search(term, SEARCH_LIMIT).await
    }

    /// Most recent synchronization runs, newest first.
    pub async fn recent_sync_logs(&self, limit: i64) -> AppResult<Vec<SyncLog>> {
        self.sync_log_repo.find_recent(limit).await
    }
}
