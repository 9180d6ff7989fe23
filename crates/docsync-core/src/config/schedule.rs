//! Periodic task schedule configuration.

use serde::{Deserialize, Serialize};

/// Schedule for the background tasks.
///
/// Expressions use the six-field cron format with a leading seconds field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Whether the scheduler registers any task at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When the catalog synchronization runs.
    #[serde(default = "default_sync_cron")]
    pub sync_cron: String,
    /// When expired access grants are revoked.
    #[serde(default = "default_revocation_cron")]
    pub revocation_cron: String,
    /// Run one catalog synchronization right after startup.
    #[serde(default)]
    pub sync_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_cron: default_sync_cron(),
            revocation_cron: default_revocation_cron(),
            sync_on_start: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sync_cron() -> String {
    "0 0 */6 * * *".to_string()
}

fn default_revocation_cron() -> String {
    "0 0 * * * *".to_string()
}
