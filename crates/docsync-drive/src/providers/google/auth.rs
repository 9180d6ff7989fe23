//! Service-account OAuth2 token source (JWT bearer grant).

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use docsync_core::error::{AppError, ErrorKind};
use docsync_core::result::AppResult;

/// Default token endpoint when the key file does not name one.
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Grant type for the JWT bearer flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion.
const ASSERTION_TTL_SECONDS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account JSON key that the token flow needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key identifier, sent as the JWT `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid service-account key: {e}"),
                e,
            )
        })
    }

    /// Read and parse a key file.
    pub async fn from_file(path: &str) -> AppResult<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read service-account key '{path}': {e}"),
                e,
            )
        })?;
        Self::from_json(&json)
    }
}

/// Claims of the signed assertion exchanged for an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    /// Issuer (the service account).
    pub iss: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Audience (the token endpoint).
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl AssertionClaims {
    /// Build the claims for `key` issued at `iat`.
    pub fn new(key: &ServiceAccountKey, scopes: &[String], iat: i64) -> Self {
        Self {
            iss: key.client_email.clone(),
            scope: scopes.join(" "),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_TTL_SECONDS,
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_TTL_SECONDS as u64
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Issues and caches bearer tokens for a service account.
#[derive(Debug)]
pub struct TokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    /// Create a token source. Fails if the private key is not valid RSA PEM.
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>, http: reqwest::Client) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid private key for {}: {e}", key.client_email),
                e,
            )
        })?;
        Ok(Self {
            key,
            encoding_key,
            scopes,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, exchanging a fresh assertion when the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.sign_assertion()?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::RemoteFetch,
                    format!("Token request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::remote_fetch(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::RemoteFetch,
                format!("Malformed token response: {e}"),
                e,
            )
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(
            account = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained Drive access token"
        );
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Sign a JWT assertion for the token endpoint.
    fn sign_assertion(&self) -> AppResult<String> {
        let claims = AssertionClaims::new(&self.key, &self.scopes, Utc::now().timestamp());
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        encode(&header, &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to sign token assertion: {e}"),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_JSON: &str = r#"{
        "type": "service_account",
        "client_email": "sync@workshop.iam.gserviceaccount.com",
        "private_key": "not a pem",
        "private_key_id": "abc"
    }"#;

    #[test]
    fn test_key_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(key.private_key_id.as_deref(), Some("abc"));
        assert!(!format!("{key:?}").contains("not a pem"));
    }

    #[test]
    fn test_malformed_key_is_configuration_error() {
        let err = ServiceAccountKey::from_json("{\"client_email\": 1}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        let err = TokenSource::new(key, vec![], reqwest::Client::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_assertion_claims() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        let scopes = vec![
            "https://www.googleapis.com/auth/drive.readonly".to_string(),
            "https://www.googleapis.com/auth/drive.metadata.readonly".to_string(),
        ];
        let claims = AssertionClaims::new(&key, &scopes, 1_000);
        assert_eq!(claims.iss, key.client_email);
        assert_eq!(claims.aud, DEFAULT_TOKEN_URI);
        assert_eq!(claims.exp, 1_000 + ASSERTION_TTL_SECONDS);
        assert!(claims.scope.contains(' '));
    }

    #[tokio::test]
    async fn test_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ServiceAccountKey::from_file(path.to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
