//! Catalog root and synchronization configuration.

use serde::{Deserialize, Serialize};

/// A named root folder of the mirrored catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolderConfig {
    /// Stable key used in configuration and admin tooling.
    pub key: String,
    /// Remote folder identifier.
    pub remote_id: String,
    /// Name shown to participants. Falls back to `key`.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl RootFolderConfig {
    /// The name shown to participants.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.key)
    }
}

/// Catalog configuration: which remote folders are mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root folders, in display order.
    #[serde(default = "default_roots")]
    pub roots: Vec<RootFolderConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
        }
    }
}

impl CatalogConfig {
    /// Remote identifiers of all configured roots, in display order.
    pub fn root_ids(&self) -> Vec<String> {
        self.roots.iter().map(|r| r.remote_id.clone()).collect()
    }

    /// Look up a configured root by its key.
    pub fn root_by_key(&self, key: &str) -> Option<&RootFolderConfig> {
        self.roots.iter().find(|r| r.key == key)
    }
}

/// Tree walk limits shared by the synchronizer and the catalog renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum folder depth below a root before the walk is aborted.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_roots() -> Vec<RootFolderConfig> {
    [
        ("EBOOKS", "12ffd7GqHAiy3J62Vu65LbVt6-ultog5Z", "📚 EBOOKS"),
        ("Pengetahuan", "1Y2SLCbyHoB53BaQTTwRta2T6dv_drRll", "🧠 Pengetahuan"),
        ("Service_Manual_1", "1CHz8UWZXfJtXlcjp9-FPAo-t_KkfTztW", "🔧 Service Manual (1)"),
        ("Service_Manual_2", "1_SsZ7SkaZxvXUZ6RUAA_o7WR_GAtgEwT", "⚙️ Service Manual (2)"),
    ]
    .into_iter()
    .map(|(key, remote_id, display)| RootFolderConfig {
        key: key.to_string(),
        remote_id: remote_id.to_string(),
        display_name: Some(display.to_string()),
    })
    .collect()
}

fn default_max_depth() -> usize {
    32
}
