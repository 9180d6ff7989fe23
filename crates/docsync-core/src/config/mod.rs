//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod catalog;
pub mod database;
pub mod drive;
pub mod logging;
pub mod schedule;

use serde::{Deserialize, Serialize};

pub use self::catalog::{CatalogConfig, RootFolderConfig, SyncConfig};
pub use self::database::DatabaseConfig;
pub use self::drive::DriveConfig;
pub use self::logging::LoggingConfig;
pub use self::schedule::ScheduleConfig;

use crate::error::AppError;

/// Prefix of environment variables that override file configuration.
const ENV_PREFIX: &str = "DOCSYNC";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Remote storage client settings.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Mirrored root folders.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Tree walk limits.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Background task schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for a named environment.
    ///
    /// Merges `config/default` with `config/{env}` and environment variables
    /// prefixed with `DOCSYNC__` (e.g. `DOCSYNC__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::deserialize_from(config)
    }

    /// Load configuration from an explicit file path plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(environment())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::deserialize_from(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::deserialize_from(config)
    }

    fn deserialize_from(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations that would make the catalog ambiguous.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut keys = std::collections::HashSet::new();
        let mut ids = std::collections::HashSet::new();
        for root in &self.catalog.roots {
            if root.remote_id.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Catalog root '{}' has an empty remote_id",
                    root.key
                )));
            }
            if !keys.insert(root.key.as_str()) {
                return Err(AppError::configuration(format!(
                    "Duplicate catalog root key '{}'",
                    root.key
                )));
            }
            if !ids.insert(root.remote_id.as_str()) {
                return Err(AppError::configuration(format!(
                    "Remote folder '{}' is configured as a root twice",
                    root.remote_id
                )));
            }
        }
        if self.sync.max_depth == 0 {
            return Err(AppError::configuration("sync.max_depth must be at least 1"));
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
