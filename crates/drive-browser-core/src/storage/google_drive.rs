//! Google Drive v3 gateway over plain REST calls.

use super::{FileEntry, GatewayError, StorageGateway};
use crate::config::BrowserSettings;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const LIST_PAGE_SIZE: &str = "1000";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh this long before the token actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Lifetime assumed when the announced one does not fit an `Instant`
const FALLBACK_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
const PARTIAL_SUFFIX: &str = ".part";

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
    next_page_token: Option<String>,
}

struct OAuthClient {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

/// Google Drive backed [`StorageGateway`]
pub struct GoogleDriveGateway {
    http: Client,
    oauth: OAuthClient,
    api_base: String,
    token_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleDriveGateway {
    /// Build the gateway and authenticate once.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if credentials are missing and
    /// `GatewayError::Auth` if Google rejects them.
    pub async fn connect(settings: &BrowserSettings) -> Result<Self, GatewayError> {
        Self::with_base_urls(settings, DRIVE_API_BASE, OAUTH_TOKEN_URL).await
    }

    /// Same as [`connect`](Self::connect) against other endpoints, e.g. a
    /// local mock server.
    ///
    /// `api_base` replaces `https://www.googleapis.com/drive/v3` and
    /// `token_url` the OAuth token endpoint.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    pub async fn with_base_urls(
        settings: &BrowserSettings,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let client_id = settings
            .google_client_id
            .as_ref()
            .ok_or_else(|| GatewayError::Config("GOOGLE_CLIENT_ID is missing".into()))?;
        let client_secret = settings
            .google_client_secret
            .as_ref()
            .ok_or_else(|| GatewayError::Config("GOOGLE_CLIENT_SECRET is missing".into()))?;
        let refresh_token = settings
            .google_refresh_token
            .as_ref()
            .ok_or_else(|| GatewayError::Config("GOOGLE_REFRESH_TOKEN is missing".into()))?;

        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        let gateway = Self {
            http,
            oauth: OAuthClient {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            },
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            token: Mutex::new(None),
        };

        gateway.access_token().await?;
        info!("Google Drive credentials obtained.");
        Ok(gateway)
    }

    /// Check connection to the Drive API
    ///
    /// # Errors
    ///
    /// Returns an error if the `about` endpoint cannot be reached.
    pub async fn check_connection(&self) -> Result<(), GatewayError> {
        let token = self.access_token().await?;
        let result = self
            .http
            .get(format!("{}/about", self.api_base))
            .bearer_auth(token)
            .query(&[("fields", "user")])
            .timeout(METADATA_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => {
                ensure_success(response, None).await?;
                info!("Successfully connected to Google Drive.");
                Ok(())
            }
            Err(e) => {
                error!("Google Drive connectivity test failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Current access token, exchanging the refresh token when stale.
    async fn access_token(&self) -> Result<String, GatewayError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        debug!("Refreshing Google access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("refresh_token", self.oauth.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&body).map_or_else(
                |_| format!("token endpoint returned {status}"),
                |e| match e.error_description {
                    Some(desc) => format!("{}: {desc}", e.error),
                    None => e.error,
                },
            );
            return Err(GatewayError::Auth(reason));
        }

        let fresh: TokenResponse = response.json().await?;
        let value = fresh.access_token.clone();
        *guard = Some(AccessToken {
            value: fresh.access_token,
            expires_at: token_deadline(Instant::now(), fresh.expires_in),
        });
        Ok(value)
    }

    async fn file_name(&self, file_id: &str) -> Result<String, GatewayError> {
        #[derive(Deserialize)]
        struct Metadata {
            name: String,
        }

        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/files/{file_id}", self.api_base))
            .bearer_auth(token)
            .query(&[("fields", "id, name")])
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;

        let metadata: Metadata = ensure_success(response, Some(file_id)).await?.json().await?;
        Ok(metadata.name)
    }
}

#[async_trait]
impl StorageGateway for GoogleDriveGateway {
    async fn list_files(&self) -> Result<Vec<FileEntry>, GatewayError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.access_token().await?;
            let mut query = vec![
                ("fields", "nextPageToken, files(id, name)".to_string()),
                ("pageSize", LIST_PAGE_SIZE.to_string()),
            ];
            if let Some(page_token) = page_token.take() {
                query.push(("pageToken", page_token));
            }

            let response = self
                .http
                .get(format!("{}/files", self.api_base))
                .bearer_auth(token)
                .query(&query)
                .timeout(METADATA_TIMEOUT)
                .send()
                .await?;

            let page: FileListResponse = ensure_success(response, None).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(count = files.len(), "Listed Drive files");
        Ok(files)
    }

    async fn download_file(
        &self,
        file_id: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf, GatewayError> {
        let name = sanitize_file_name(&self.file_name(file_id).await?, file_id);
        tokio::fs::create_dir_all(destination_dir).await?;

        let output_path = destination_dir.join(&name);
        let partial_path = destination_dir.join(format!("{name}{PARTIAL_SUFFIX}"));

        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/files/{file_id}", self.api_base))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = ensure_success(response, Some(file_id)).await?;

        if let Err(e) = write_body(response, &partial_path).await {
            if let Err(rm) = tokio::fs::remove_file(&partial_path).await {
                warn!(path = %partial_path.display(), error = %rm, "Failed to remove partial download");
            }
            return Err(e);
        }

        tokio::fs::rename(&partial_path, &output_path).await?;
        info!(file_id, path = %output_path.display(), "Downloaded Drive file");
        Ok(output_path)
    }
}

/// When a token issued at `now` with lifetime `expires_in` seconds expires.
fn token_deadline(now: Instant, expires_in: u64) -> Instant {
    now.checked_add(Duration::from_secs(expires_in))
        .or_else(|| now.checked_add(FALLBACK_TOKEN_LIFETIME))
        .unwrap_or(now)
}

/// Stream a response body to `path`, verifying the announced length.
async fn write_body(response: Response, path: &Path) -> Result<u64, GatewayError> {
    let expected = response.content_length();
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut received: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    match expected {
        Some(expected) if expected != received => {
            Err(GatewayError::Truncated { expected, received })
        }
        _ => Ok(received),
    }
}

async fn ensure_success(response: Response, file_id: Option<&str>) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match (status, file_id) {
        (StatusCode::NOT_FOUND, Some(id)) => GatewayError::NotFound(id.to_string()),
        (StatusCode::UNAUTHORIZED, _) => GatewayError::Auth(message),
        (StatusCode::FORBIDDEN, _) if message.contains("insufficient") => {
            GatewayError::Auth(message)
        }
        _ => GatewayError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Reduce a remote display name to one safe path component.
///
/// Falls back to `fallback` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use drive_browser_core::storage::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("a/b\\c.txt", "id"), "a_b_c.txt");
/// assert_eq!(sanitize_file_name("..", "id"), "id");
/// ```
#[must_use]
pub fn sanitize_file_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}
