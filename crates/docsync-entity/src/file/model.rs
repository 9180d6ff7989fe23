//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A mirrored remote document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Local row identifier.
    pub id: i64,
    /// Stable remote identifier (unique).
    pub remote_id: String,
    /// Display name (including extension).
    pub name: String,
    /// Media type reported by the provider.
    pub mime_type: String,
    /// The folder containing this file.
    pub folder_id: i64,
    /// When this row was last reconciled against the remote.
    pub last_synced_at: DateTime<Utc>,
    /// Link that opens the document in the provider's viewer.
    pub view_link: Option<String>,
    /// Direct download link.
    pub download_link: Option<String>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data written when a file is first seen or refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    /// Stable remote identifier.
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Media type.
    pub mime_type: String,
    /// Owning folder row.
    pub folder_id: i64,
    /// Viewer link.
    pub view_link: Option<String>,
    /// Download link.
    pub download_link: Option<String>,
    /// Reconciliation time.
    pub synced_at: DateTime<Utc>,
}
