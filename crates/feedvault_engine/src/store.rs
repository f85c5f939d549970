use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use vault_logging::vault_debug;

use crate::config::StoreConfig;

const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const API_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("feedvault/", env!("CARGO_PKG_VERSION"));

/// Opaque revision marker (the remote's content hash) used for
/// compare-and-swap writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One snapshot of the remote file: its text plus the revision to present
/// on the next write. `revision` is `None` when the file does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub revision: Option<Revision>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileStoreError {
    /// The remote's current revision no longer matches the one presented;
    /// another writer got there first. Callers must re-fetch and resubmit.
    #[error("remote store conflict: {0}")]
    Conflict(String),
    #[error("remote store error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("network error talking to the remote store: {0}")]
    Network(String),
    #[error("remote store returned undecodable content: {0}")]
    Encoding(String),
}

/// A single remote text file addressed as a record store.
///
/// `put` is a compare-and-swap: it succeeds only if the remote's revision
/// still equals `expected` (or the file does not exist when `expected` is
/// `None`).
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn fetch(&self) -> Result<StoredFile, FileStoreError>;

    async fn put(
        &self,
        content: &str,
        message: &str,
        expected: Option<&Revision>,
    ) -> Result<Revision, FileStoreError>;
}

/// [`FileStore`] backed by the GitHub contents API.
///
/// A confirmed 404 on read is the empty initial state, not an error; any
/// other failure propagates so that a transient outage is never mistaken
/// for "file does not exist yet".
#[derive(Debug, Clone)]
pub struct GithubFileStore {
    config: StoreConfig,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    content: UpdatedContent,
}

#[derive(Debug, Deserialize)]
struct UpdatedContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GithubFileStore {
    pub fn new(config: StoreConfig) -> Result<Self, FileStoreError> {
        Self::with_api_base(config, GITHUB_API_BASE_URL)
    }

    /// Points the client at an alternative API host. Used by tests.
    pub fn with_api_base(
        config: StoreConfig,
        api_base: impl Into<String>,
    ) -> Result<Self, FileStoreError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| FileStoreError::Network(err.to_string()))?;
        Ok(Self {
            config,
            api_base: api_base.into(),
            client,
        })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.config.owner, self.config.repo, self.config.file_path
        )
    }

    async fn api_error(response: reqwest::Response) -> FileStoreError {
        let status = response.status();
        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        // The contents API reports a stale sha as 409, historically as a
        // 422 whose message names the mismatching sha. Other 422s are
        // ordinary validation failures, not lost races.
        let sha_mismatch = status == StatusCode::UNPROCESSABLE_ENTITY
            && (message.contains("sha") || message.contains("does not match"));
        if status == StatusCode::CONFLICT || sha_mismatch {
            FileStoreError::Conflict(message)
        } else {
            FileStoreError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl FileStore for GithubFileStore {
    async fn fetch(&self) -> Result<StoredFile, FileStoreError> {
        let url = format!("{}?ref={}", self.contents_url(), self.config.branch);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.config.token))
            .header(ACCEPT, API_ACCEPT)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            vault_debug!("remote feed file absent; starting from an empty store");
            return Ok(StoredFile {
                content: "{}".to_string(),
                revision: None,
            });
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let payload: ContentsResponse = response
            .json()
            .await
            .map_err(|err| FileStoreError::Encoding(err.to_string()))?;
        let content = decode_transport_content(&payload.content)?;
        Ok(StoredFile {
            content,
            revision: Some(Revision(payload.sha)),
        })
    }

    async fn put(
        &self,
        content: &str,
        message: &str,
        expected: Option<&Revision>,
    ) -> Result<Revision, FileStoreError> {
        let body = UpdateRequest {
            message,
            content: BASE64.encode(content),
            branch: &self.config.branch,
            sha: expected.map(Revision::as_str),
        };
        let response = self
            .client
            .put(self.contents_url())
            .header(AUTHORIZATION, format!("token {}", self.config.token))
            .header(ACCEPT, API_ACCEPT)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let payload: UpdateResponse = response
            .json()
            .await
            .map_err(|err| FileStoreError::Encoding(err.to_string()))?;
        Ok(Revision(payload.content.sha))
    }
}

/// The contents API wraps base64 payloads at 60 columns; strip the
/// whitespace before decoding.
fn decode_transport_content(encoded: &str) -> Result<String, FileStoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|err| FileStoreError::Encoding(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| FileStoreError::Encoding(err.to_string()))
}

fn map_transport_error(err: reqwest::Error) -> FileStoreError {
    if err.is_timeout() {
        FileStoreError::Network(format!("timeout: {err}"))
    } else {
        FileStoreError::Network(err.to_string())
    }
}
