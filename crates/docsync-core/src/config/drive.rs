//! Remote storage (Google Drive) configuration.

use serde::{Deserialize, Serialize};

/// Remote storage client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Which client implementation to use: `"google"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Path to the service-account JSON key file.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    /// Base URL of the Drive v3 REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// OAuth scopes requested for the service account.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Per-request timeout in seconds. Remote calls fail instead of hanging.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Page size used when listing folder children.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            credentials_file: default_credentials_file(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            request_timeout_seconds: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_credentials_file() -> String {
    "credentials/service-account.json".to_string()
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/drive.readonly".to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    1000
}
