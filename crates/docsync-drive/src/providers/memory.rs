//! In-memory remote storage client.
//!
//! Holds a mutable folder tree and can be told to fail specific calls, which
//! makes it the remote of choice for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use docsync_core::error::AppError;
use docsync_core::result::AppResult;
use docsync_core::traits::remote::{
    RemoteFolderMeta, RemoteItem, RemoteItemKind, RemoteStorageClient,
};

use super::google::FOLDER_MIME_TYPE;

#[derive(Debug, Clone)]
struct Node {
    item: RemoteItem,
    parent: Option<String>,
}

#[derive(Debug, Default)]
struct Tree {
    /// Every node by id.
    nodes: HashMap<String, Node>,
    /// Ids in insertion order; listings follow it.
    order: Vec<String>,
    failing: HashSet<String>,
}

/// A remote folder tree kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDrive {
    tree: Arc<RwLock<Tree>>,
    list_calls: Arc<AtomicU64>,
}

impl InMemoryDrive {
    /// Create an empty drive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder. `parent` is `None` for a root.
    pub async fn add_folder(&self, parent: Option<&str>, id: &str, name: &str) {
        let item = RemoteItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: RemoteItemKind::Folder,
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            view_link: None,
            download_link: None,
        };
        self.insert(parent, item).await;
    }

    /// Add a document inside `parent`.
    pub async fn add_file(&self, parent: &str, id: &str, name: &str, mime_type: &str) {
        let item = RemoteItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: RemoteItemKind::File,
            mime_type: Some(mime_type.to_string()),
            view_link: Some(format!("https://drive.google.com/file/d/{id}/view")),
            download_link: Some(format!("https://drive.google.com/uc?id={id}&export=download")),
        };
        self.insert(Some(parent), item).await;
    }

    async fn insert(&self, parent: Option<&str>, item: RemoteItem) {
        let mut tree = self.tree.write().await;
        let id = item.id.clone();
        if !tree.nodes.contains_key(&id) {
            tree.order.push(id.clone());
        }
        tree.nodes.insert(
            id,
            Node {
                item,
                parent: parent.map(str::to_string),
            },
        );
    }

    /// Rename an entry. Unknown ids are ignored.
    pub async fn rename(&self, id: &str, name: &str) {
        let mut tree = self.tree.write().await;
        if let Some(node) = tree.nodes.get_mut(id) {
            node.item.name = name.to_string();
        }
    }

    /// Move an entry under a different parent.
    pub async fn move_to(&self, id: &str, parent: &str) {
        let mut tree = self.tree.write().await;
        if let Some(node) = tree.nodes.get_mut(id) {
            node.parent = Some(parent.to_string());
        }
    }

    /// Delete an entry (its descendants become unreachable).
    pub async fn remove(&self, id: &str) {
        let mut tree = self.tree.write().await;
        tree.nodes.remove(id);
        tree.order.retain(|other| other != id);
    }

    /// Make every call touching `id` fail with a fetch error.
    pub async fn fail_on(&self, id: &str) {
        self.tree.write().await.failing.insert(id.to_string());
    }

    /// Stop injecting failures.
    pub async fn clear_failures(&self) {
        self.tree.write().await.failing.clear();
    }

    /// Number of `list_children` calls served so far.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    fn check_failure(tree: &Tree, id: &str) -> AppResult<()> {
        if tree.failing.contains(id) {
            return Err(AppError::remote_fetch(format!(
                "Simulated failure fetching {id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStorageClient for InMemoryDrive {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn get_metadata(&self, id: &str) -> AppResult<RemoteFolderMeta> {
        let tree = self.tree.read().await;
        Self::check_failure(&tree, id)?;
        tree.nodes
            .get(id)
            .map(|node| RemoteFolderMeta {
                id: node.item.id.clone(),
                name: node.item.name.clone(),
            })
            .ok_or_else(|| AppError::remote_not_found(format!("folder {id} does not exist")))
    }

    async fn list_children(&self, id: &str) -> AppResult<Vec<RemoteItem>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let tree = self.tree.read().await;
        Self::check_failure(&tree, id)?;
        if !tree.nodes.contains_key(id) {
            return Err(AppError::remote_not_found(format!(
                "folder {id} does not exist"
            )));
        }
        Ok(tree
            .order
            .iter()
            .filter_map(|child| tree.nodes.get(child))
            .filter(|node| node.parent.as_deref() == Some(id))
            .map(|node| node.item.clone())
            .collect())
    }

    async fn find_folder_by_name(&self, name: &str) -> AppResult<Option<String>> {
        let tree = self.tree.read().await;
        Ok(tree
            .order
            .iter()
            .filter_map(|id| tree.nodes.get(id))
            .find(|node| node.item.is_folder() && node.item.name == name)
            .map(|node| node.item.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_core::error::ErrorKind;

    async fn sample() -> InMemoryDrive {
        let drive = InMemoryDrive::new();
        drive.add_folder(None, "root", "EBOOKS").await;
        drive.add_folder(Some("root"), "engine", "Engine").await;
        drive.add_file("root", "f1", "intro.pdf", "application/pdf").await;
        drive.add_file("engine", "f2", "pistons.pdf", "application/pdf").await;
        drive
    }

    #[tokio::test]
    async fn test_listing_and_metadata() {
        let drive = sample().await;
        let meta = drive.get_metadata("root").await.unwrap();
        assert_eq!(meta.name, "EBOOKS");

        let children = drive.list_children("root").await.unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0].is_folder());
        assert_eq!(children[1].id, "f1");
        assert_eq!(drive.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found() {
        let drive = sample().await;
        let err = drive.get_metadata("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteNotFound);
        let err = drive.list_children("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteNotFound);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let drive = sample().await;
        drive.fail_on("engine").await;
        assert_eq!(
            drive.list_children("engine").await.unwrap_err().kind,
            ErrorKind::RemoteFetch
        );
        drive.clear_failures().await;
        assert_eq!(drive.list_children("engine").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations() {
        let drive = sample().await;
        drive.rename("f1", "preface.pdf").await;
        drive.move_to("f2", "root").await;
        drive.remove("engine").await;

        let names: Vec<String> = drive
            .list_children("root")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["preface.pdf", "pistons.pdf"]);
        assert_eq!(drive.find_folder_by_name("EBOOKS").await.unwrap().as_deref(), Some("root"));
        assert!(drive.find_folder_by_name("Engine").await.unwrap().is_none());
    }
}
