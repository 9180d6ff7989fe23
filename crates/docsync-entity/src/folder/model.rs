//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A mirrored remote folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Local row identifier.
    pub id: i64,
    /// Stable remote identifier (unique).
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Parent folder row (null for roots).
    pub parent_id: Option<i64>,
    /// Materialized path (e.g. `/EBOOKS/Engine`).
    pub path: String,
    /// When this row was last reconciled against the remote.
    pub last_synced_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Path of a direct child with the given name.
    pub fn child_path(&self, name: &str) -> String {
        child_path(&self.path, name)
    }
}

/// Materialized path of `name` below `parent_path`.
///
/// Roots are passed an empty parent path and end up at `/name`.
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{}/{}", parent_path.trim_end_matches('/'), name)
}

/// Data written when a folder is first seen or refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFolder {
    /// Stable remote identifier.
    pub remote_id: String,
    /// Display name.
    pub name: String,
    /// Parent folder row (None for roots).
    pub parent_id: Option<i64>,
    /// Materialized path.
    pub path: String,
    /// Reconciliation time.
    pub synced_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "EBOOKS"), "/EBOOKS");
        assert_eq!(child_path("/", "EBOOKS"), "/EBOOKS");
        assert_eq!(child_path("/EBOOKS", "Engine"), "/EBOOKS/Engine");
    }
}
