//! Remote storage client trait for the mirrored cloud folder tree.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Identity of a remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolderMeta {
    /// Remote identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Whether a remote entry is a folder or a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteItemKind {
    /// A folder that may have children of its own.
    Folder,
    /// A leaf document.
    File,
}

/// One child entry of a remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Remote identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or file.
    pub kind: RemoteItemKind,
    /// Media type reported by the provider.
    pub mime_type: Option<String>,
    /// Link that opens the document in the provider's viewer.
    pub view_link: Option<String>,
    /// Direct download link.
    pub download_link: Option<String>,
}

impl RemoteItem {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == RemoteItemKind::Folder
    }
}

/// Read-only access to a hierarchical remote file store.
///
/// Implementations must fail fast rather than hang: every call is expected
/// to carry its own timeout. A missing identifier is reported with
/// [`ErrorKind::RemoteNotFound`](crate::error::ErrorKind::RemoteNotFound),
/// every other failure with
/// [`ErrorKind::RemoteFetch`](crate::error::ErrorKind::RemoteFetch).
#[async_trait]
pub trait RemoteStorageClient: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. `"google"`, `"memory"`).
    fn provider_type(&self) -> &str;

    /// Fetch the identity of a folder.
    async fn get_metadata(&self, id: &str) -> AppResult<RemoteFolderMeta>;

    /// List every direct child of a folder, following all result pages.
    async fn list_children(&self, id: &str) -> AppResult<Vec<RemoteItem>>;

    /// Find the identifier of a folder by its exact name.
    async fn find_folder_by_name(&self, name: &str) -> AppResult<Option<String>>;
}
