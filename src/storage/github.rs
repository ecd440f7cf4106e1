//! GitHub contents API as a [`RemoteStore`].
//!
//! Files live at `GET/PUT {api_base}/repos/{account}/{repository}/contents/{name}`.
//! Content travels base64-encoded; the blob `sha` is the revision token and
//! is sent back on update as the optimistic-concurrency precondition.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ConfigError, SyncCredentials};
use super::traits::{RemoteArtifact, RemoteStore, Revision, StoreError};

const USER_AGENT: &str = concat!("remark-sync/", env!("CARGO_PKG_VERSION"));

pub struct GitHubContentsStore {
    client: reqwest::Client,
    api_base: Url,
    credentials: SyncCredentials,
}

impl GitHubContentsStore {
    /// Validates credentials and the API base before anything touches the network.
    pub fn new(api_base: &str, credentials: SyncCredentials) -> Result<Self, ConfigError> {
        credentials.validate()?;
        let api_base = Url::parse(api_base).map_err(|e| ConfigError::InvalidApiBase {
            url: api_base.to_string(),
            reason: e.to_string(),
        })?;
        if api_base.cannot_be_a_base() {
            return Err(ConfigError::InvalidApiBase {
                url: api_base.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_base,
            credentials,
        })
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.credentials.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn download_raw(&self, download_url: &str) -> Result<String, StoreError> {
        let url = Url::parse(download_url).map_err(|e| StoreError::Decode(e.to_string()))?;
        let res = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, url = download_url, "Failed to read error body");
                    String::new()
                }
            };
            return Err(status_error(status, &body, download_url));
        }
        res.text().await.map_err(|e| StoreError::Transport(e.to_string()))
    }
}

/// `{base}/repos/{owner}/{repo}/contents/{name...}`, each segment escaped.
pub(crate) fn contents_url(base: &Url, owner: &str, repo: &str, name: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(name.split('/').filter(|s| !s.is_empty()));
    }
    url
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// Inline base64 content to text. The API wraps base64 at 60 columns.
///
/// Invalid UTF-8 is replaced rather than rejected: the file still comes back
/// with its revision, so a cycle can recognise it as malformed and overwrite it.
pub(crate) fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(format!("base64: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Map a non-success status to the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str, name: &str) -> StoreError {
    let message = serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(status.as_u16()),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => StoreError::Conflict {
            name: name.to_string(),
        },
        // Update of an existing file without a sha, i.e. someone created it after we looked.
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("sha") => StoreError::Conflict {
            name: name.to_string(),
        },
        _ => StoreError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteStore for GitHubContentsStore {
    async fn get(&self, name: &str) -> Result<Option<RemoteArtifact>, StoreError> {
        let url = contents_url(&self.api_base, &self.credentials.account, &self.credentials.repository, name);
        debug!(%url, "GET contents");

        let res = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = res.text().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status, &body, name));
        }

        let file: ContentsResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Decode(format!("{} is not a file: {}", name, e)))?;

        // Files above the inline size limit come back with encoding "none".
        let content = match (file.encoding.as_deref(), file.download_url.as_deref()) {
            (Some("none"), Some(download_url)) => self.download_raw(download_url).await?,
            _ => decode_content(&file.content)?,
        };

        Ok(Some(RemoteArtifact {
            name: name.to_string(),
            content,
            revision: Some(Revision::new(file.sha)),
        }))
    }

    async fn put(
        &self,
        name: &str,
        content: &str,
        expected: Option<&Revision>,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let url = contents_url(&self.api_base, &self.credentials.account, &self.credentials.repository, name);
        debug!(%url, conditional = expected.is_some(), "PUT contents");

        let body = PutRequest {
            message,
            content: encode_content(content),
            sha: expected.map(Revision::as_str),
        };
        let res = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status, &text, name));
        }

        let parsed: PutResponse = serde_json::from_str(&text)
            .map_err(|e| StoreError::Decode(format!("PUT {} response: {}", name, e)))?;
        Ok(Revision::new(parsed.content.sha))
    }
}
