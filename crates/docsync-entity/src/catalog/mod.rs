//! Read-side views of the mirrored catalog.

pub mod tree;
pub mod views;

pub use tree::{CatalogFile, CatalogNode, RootCatalog};
pub use views::{CatalogItem, FileInfo, FolderContents, RootSummary, SearchHit};
