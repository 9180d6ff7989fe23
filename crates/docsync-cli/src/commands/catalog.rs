//! Catalog browsing commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_entity::catalog::{CatalogItem, CatalogNode, RootSummary, SearchHit};

use super::Services;

/// Arguments for catalog commands
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List synchronized roots with their direct file counts
    Roots,
    /// Print the full folder tree
    Tree {
        /// Only this root key
        #[arg(short, long)]
        root: Option<String>,
        /// Render as this participant sees it (checks document access)
        #[arg(short, long)]
        participant: Option<i64>,
    },
    /// List the contents of one folder
    Folder {
        /// Remote folder ID
        remote_id: String,
    },
    /// Show details of one file
    File {
        /// Remote file ID
        remote_id: String,
        /// Show as this participant sees it (checks document access)
        #[arg(short, long)]
        participant: Option<i64>,
    },
    /// Search file names
    Search {
        /// Search term (at least two characters)
        term: String,
    },
}

/// Root summary display row
#[derive(Debug, Serialize, Tabled)]
struct RootRow {
    /// Root key
    key: String,
    /// Display name
    name: String,
    /// Remote ID
    remote_id: String,
    /// Direct files
    files: u64,
}

impl From<RootSummary> for RootRow {
    fn from(s: RootSummary) -> Self {
        Self {
            key: s.key,
            name: s.display_name,
            remote_id: s.remote_id,
            files: s.file_count,
        }
    }
}

/// Folder entry display row
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    /// Entry type
    kind: String,
    /// Name
    name: String,
    /// Remote ID
    remote_id: String,
    /// Media type
    mime_type: String,
}

impl From<CatalogItem> for ItemRow {
    fn from(item: CatalogItem) -> Self {
        Self {
            kind: if item.is_directory { "folder" } else { "file" }.to_string(),
            name: item.name,
            remote_id: item.remote_id,
            mime_type: output::opt(item.mime_type),
        }
    }
}

/// Search hit display row
#[derive(Debug, Serialize, Tabled)]
struct HitRow {
    /// File name
    name: String,
    /// Folder path
    folder: String,
    /// Remote ID
    remote_id: String,
}

impl From<SearchHit> for HitRow {
    fn from(hit: SearchHit) -> Self {
        Self {
            name: hit.name,
            folder: hit.folder_path,
            remote_id: hit.remote_id,
        }
    }
}

/// Execute catalog commands
pub async fn execute(
    args: &CatalogArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let catalog = &services.catalog;

    match &args.command {
        CatalogCommand::Roots => {
            let rows: Vec<RootRow> = catalog
                .roots_summary()
                .await?
                .into_iter()
                .map(RootRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::Tree { root, participant } => {
            let mut roots = match participant {
                Some(id) => catalog.catalog_for(*id).await?,
                None => catalog.catalog().await?,
            };
            if let Some(key) = root {
                roots.retain(|r| &r.key == key);
            }
            match format {
                OutputFormat::Json => output::print_json(&roots),
                OutputFormat::Table => {
                    if roots.is_empty() {
                        output::print_warning("No synchronized roots.");
                    }
                    for root in &roots {
                        println!("{} ({} files)", root.display_name, root.tree.total_files());
                        print_tree(&root.tree, 1);
                    }
                }
            }
        }
        CatalogCommand::Folder { remote_id } => {
            let contents = catalog
                .folder_contents(remote_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Folder '{}' not found", remote_id)))?;
            match format {
                OutputFormat::Json => output::print_json(&contents),
                OutputFormat::Table => {
                    println!("{}", contents.name);
                    let rows: Vec<ItemRow> = contents.items.into_iter().map(ItemRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        CatalogCommand::File {
            remote_id,
            participant,
        } => {
            let info = match participant {
                Some(id) => catalog.file_info_for(*id, remote_id).await?,
                None => catalog.file_info(remote_id).await?,
            }
            .ok_or_else(|| AppError::not_found(format!("File '{}' not found", remote_id)))?;
            output::print_item(&info, format);
        }
        CatalogCommand::Search { term } => {
            if term.trim().chars().count() < 2 {
                output::print_warning("Search terms need at least two characters.");
            }
            let rows: Vec<HitRow> = catalog
                .search(term)
                .await?
                .into_iter()
                .map(HitRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

fn print_tree(node: &CatalogNode, depth: usize) {
    let indent = "  ".repeat(depth);
    for folder in &node.subfolders {
        println!("{}{}/", indent, folder.name);
        print_tree(folder, depth + 1);
    }
    for file in &node.files {
        println!("{}{}", indent, file.name);
    }
}
