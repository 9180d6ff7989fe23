//! Flat catalog views: root summaries, folder listings, file details, search hits.

use serde::{Deserialize, Serialize};

use crate::file::File;
use crate::folder::Folder;

/// Summary line for one configured root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSummary {
    /// Configuration key.
    pub key: String,
    /// Name shown to participants.
    pub display_name: String,
    /// Remote folder identifier.
    pub remote_id: String,
    /// Number of files directly inside the root folder.
    pub file_count: u64,
}

/// An entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Remote identifier.
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Whether this entry is a folder.
    pub is_directory: bool,
    /// Media type (files only).
    pub mime_type: Option<String>,
    /// Viewer link (files only).
    pub view_link: Option<String>,
}

impl From<Folder> for CatalogItem {
    fn from(folder: Folder) -> Self {
        Self {
            remote_id: folder.remote_id,
            name: folder.name,
            is_directory: true,
            mime_type: None,
            view_link: None,
        }
    }
}

impl From<File> for CatalogItem {
    fn from(file: File) -> Self {
        Self {
            remote_id: file.remote_id,
            name: file.name,
            is_directory: false,
            mime_type: Some(file.mime_type),
            view_link: file.view_link,
        }
    }
}

/// Immediate children of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderContents {
    /// Folder name.
    pub name: String,
    /// Sub-folders alphabetically, then files alphabetically.
    pub items: Vec<CatalogItem>,
}

/// Details of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Remote identifier.
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Media type.
    pub mime_type: String,
    /// Remote identifier of the containing folder.
    pub folder_remote_id: Option<String>,
    /// Viewer link.
    pub view_link: Option<String>,
    /// Download link.
    pub download_link: Option<String>,
}

/// A file matched by a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchHit {
    /// Remote identifier.
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Media type.
    pub mime_type: String,
    /// Path of the containing folder.
    pub folder_path: String,
}
