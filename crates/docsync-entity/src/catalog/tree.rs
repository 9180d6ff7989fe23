//! Hierarchical catalog structures for browsing.

use serde::{Deserialize, Serialize};

use crate::file::File;
use crate::folder::Folder;

/// A folder in the rendered catalog tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogNode {
    /// Folder name.
    pub name: String,
    /// Remote folder identifier.
    pub remote_id: String,
    /// Full path.
    pub path: String,
    /// Child folders, sorted by name.
    pub subfolders: Vec<CatalogNode>,
    /// Files directly inside this folder, sorted by name.
    pub files: Vec<CatalogFile>,
}

impl CatalogNode {
    /// A node with no children yet.
    pub fn leaf(folder: &Folder) -> Self {
        Self {
            name: folder.name.clone(),
            remote_id: folder.remote_id.clone(),
            path: folder.path.clone(),
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Total number of files in this node and every descendant.
    pub fn total_files(&self) -> usize {
        self.files.len()
            + self
                .subfolders
                .iter()
                .map(CatalogNode::total_files)
                .sum::<usize>()
    }
}

/// A file leaf of the rendered catalog tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// File name.
    pub name: String,
    /// Remote file identifier.
    pub remote_id: String,
    /// Media type.
    pub mime_type: String,
    /// Viewer link.
    pub view_link: Option<String>,
    /// Download link.
    pub download_link: Option<String>,
}

impl From<File> for CatalogFile {
    fn from(file: File) -> Self {
        Self {
            name: file.name,
            remote_id: file.remote_id,
            mime_type: file.mime_type,
            view_link: file.view_link,
            download_link: file.download_link,
        }
    }
}

/// One configured root with its full tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootCatalog {
    /// Configuration key of the root.
    pub key: String,
    /// Name shown to participants.
    pub display_name: String,
    /// The rendered tree.
    pub tree: CatalogNode,
}
