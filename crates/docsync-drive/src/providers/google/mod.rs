//! Google Drive v3 client.

pub mod auth;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use docsync_core::config::DriveConfig;
use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;
use docsync_core::traits::remote::{
    RemoteFolderMeta, RemoteItem, RemoteItemKind, RemoteStorageClient,
};

use self::auth::{ServiceAccountKey, TokenSource};

/// Media type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for each child entry.
const LIST_FIELDS: &str =
    "nextPageToken, files(id, name, mimeType, webViewLink, webContentLink)";

/// A file resource as returned by the Drive API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    web_content_link: Option<String>,
}

impl From<DriveFile> for RemoteItem {
    fn from(file: DriveFile) -> Self {
        let kind = if file.mime_type.as_deref() == Some(FOLDER_MIME_TYPE) {
            RemoteItemKind::Folder
        } else {
            RemoteItemKind::File
        };
        Self {
            id: file.id,
            name: file.name,
            kind,
            mime_type: file.mime_type,
            view_link: file.web_view_link,
            download_link: file.web_content_link,
        }
    }
}

/// One page of a `files.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Read-only Drive client authenticated as a service account.
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    base_url: String,
    page_size: u32,
}

impl GoogleDriveClient {
    /// Build a client from configuration, loading the service-account key.
    pub async fn from_config(config: &DriveConfig) -> AppResult<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_file).await?;
        Self::new(key, config)
    }

    /// Build a client from an already-loaded key.
    pub fn new(key: ServiceAccountKey, config: &DriveConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;
        let tokens = TokenSource::new(key, config.scopes.clone(), http.clone())?;
        Ok(Self {
            http,
            tokens: Arc::new(tokens),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    /// Issue an authenticated GET and decode the JSON body.
    ///
    /// A 404 becomes `RemoteNotFound`; every other failure is `RemoteFetch`.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> AppResult<T> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::RemoteFetch,
                    format!("Drive request for {what} failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::remote_not_found(format!("{what} does not exist")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::remote_fetch(format!(
                "Drive returned {status} for {what}: {body}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::RemoteFetch,
                format!("Malformed Drive response for {what}: {e}"),
                e,
            )
        })
    }
}

/// Quote a value for use inside a Drive search query string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Query selecting the non-trashed children of a folder.
fn children_query(folder_id: &str) -> String {
    format!("{} in parents and trashed = false", quote(folder_id))
}

/// Query selecting folders with an exact name.
fn folder_name_query(name: &str) -> String {
    format!(
        "name = {} and mimeType = {} and trashed = false",
        quote(name),
        quote(FOLDER_MIME_TYPE)
    )
}

#[async_trait]
impl RemoteStorageClient for GoogleDriveClient {
    fn provider_type(&self) -> &str {
        "google"
    }

    #[instrument(skip(self))]
    async fn get_metadata(&self, id: &str) -> AppResult<RemoteFolderMeta> {
        let url = format!("{}/files/{}", self.base_url, id);
        let query = [
            ("fields", "id, name, mimeType".to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        let file: DriveFile = self.get_json(&url, &query, &format!("folder {id}")).await?;
        Ok(RemoteFolderMeta {
            id: file.id,
            name: file.name,
        })
    }

    #[instrument(skip(self))]
    async fn list_children(&self, id: &str) -> AppResult<Vec<RemoteItem>> {
        let url = format!("{}/files", self.base_url);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let mut query = vec![
                ("q", children_query(id)),
                ("fields", LIST_FIELDS.to_string()),
                ("pageSize", self.page_size.to_string()),
                ("supportsAllDrives", "true".to_string()),
                ("includeItemsFromAllDrives", "true".to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: FileList = self
                .get_json(&url, &query, &format!("children of {id}"))
                .await?;
            pages += 1;
            items.extend(page.files.into_iter().map(RemoteItem::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(folder = id, pages, items = items.len(), "Listed Drive folder");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn find_folder_by_name(&self, name: &str) -> AppResult<Option<String>> {
        let url = format!("{}/files", self.base_url);
        let query = [
            ("q", folder_name_query(name)),
            ("fields", "files(id, name)".to_string()),
            ("pageSize", "1".to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
        ];
        let page: FileList = self
            .get_json(&url, &query, &format!("folder named '{name}'"))
            .await?;
        Ok(page.files.into_iter().next().map(|f| f.id))
    }
}
