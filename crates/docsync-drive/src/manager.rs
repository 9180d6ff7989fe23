//! Remote client selection from configuration.

use std::sync::Arc;

use tracing::info;

use docsync_core::config::DriveConfig;
use docsync_core::error::AppError;
use docsync_core::result::AppResult;
use docsync_core::traits::remote::RemoteStorageClient;

use crate::providers::{GoogleDriveClient, InMemoryDrive};

/// Build the remote client named by `config.provider`.
///
/// `"google"` loads the service-account key from `config.credentials_file`;
/// `"memory"` starts with an empty tree.
pub async fn connect(config: &DriveConfig) -> AppResult<Arc<dyn RemoteStorageClient>> {
    let client: Arc<dyn RemoteStorageClient> = match config.provider.as_str() {
        "google" => Arc::new(GoogleDriveClient::from_config(config).await?),
        "memory" => Arc::new(InMemoryDrive::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown drive provider '{other}'"
            )));
        }
    };
    info!(provider = client.provider_type(), "Remote storage client ready");
    Ok(client)
}
