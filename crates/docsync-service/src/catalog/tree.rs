//! Catalog tree assembly from the persisted folder hierarchy.

use std::collections::VecDeque;

use tracing::warn;

use docsync_core::result::AppResult;
use docsync_database::repositories::{FileRepository, FolderRepository};
use docsync_entity::catalog::{CatalogFile, CatalogNode};
use docsync_entity::folder::Folder;

/// Build the tree below `root`, one query pair per folder.
///
/// Folders are expanded breadth-first into a flat arena and folded back into
/// nested nodes afterwards, so neither pass recurses. Folders deeper than
/// `max_depth` below the root are rendered without their contents.
pub(crate) async fn build_tree(
    folder_repo: &FolderRepository,
    file_repo: &FileRepository,
    root: &Folder,
    max_depth: usize,
) -> AppResult<CatalogNode> {
    let mut nodes: Vec<Option<CatalogNode>> = vec![Some(CatalogNode::leaf(root))];
    let mut parents: Vec<Option<usize>> = vec![None];
    let mut queue: VecDeque<(usize, i64, usize)> = VecDeque::from([(0, root.id, 0)]);

    while let Some((index, folder_id, depth)) = queue.pop_front() {
        let files = file_repo.find_by_folder(folder_id).await?;
        if let Some(node) = nodes[index].as_mut() {
            node.files = files.into_iter().map(CatalogFile::from).collect();
        }

        let children = folder_repo.find_children(folder_id).await?;
        if depth >= max_depth {
            if !children.is_empty() {
                warn!(
                    folder_id,
                    depth, "Catalog depth limit reached, sub-folders omitted"
                );
            }
            continue;
        }
        for child in children {
            nodes.push(Some(CatalogNode::leaf(&child)));
            parents.push(Some(index));
            queue.push_back((nodes.len() - 1, child.id, depth + 1));
        }
    }

    // Children always sit after their parent in the arena. Walking backwards
    // completes every node before it is attached, but attaches siblings in
    // reverse, so each node's list is flipped right before it moves.
    for index in (1..nodes.len()).rev() {
        let Some(mut node) = nodes[index].take() else {
            continue;
        };
        node.subfolders.reverse();
        if let Some(parent) = parents[index].and_then(|p| nodes[p].as_mut()) {
            parent.subfolders.push(node);
        }
    }

    let mut tree = nodes
        .swap_remove(0)
        .unwrap_or_else(|| CatalogNode::leaf(root));
    tree.subfolders.reverse();
    Ok(tree)
}
