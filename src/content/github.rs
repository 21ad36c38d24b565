//! GitHub content source
//!
//! Reads project files through the GitHub contents API. Rate-limit
//! responses are retried with exponential backoff before the request is
//! reported as `UpstreamUnavailable`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::ContentSource;
use crate::config::GitHubConfig;
use crate::error::{CatalogError, Result};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const CLIENT_USER_AGENT: &str = concat!("project-catalog/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct GitHubContentSource {
    client: Client,
    config: GitHubConfig,
    /// Repository directory holding the project directories
    content_root: String,
    token: Option<String>,
}

impl GitHubContentSource {
    pub fn new(config: GitHubConfig, content_root: impl Into<String>) -> Result<Self> {
        let token = config.token();
        Self::with_token(config, content_root, token)
    }

    pub fn with_token(
        config: GitHubConfig,
        content_root: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            content_root: content_root.into(),
            token,
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{root}/{segments..}?ref={branch}`
    fn contents_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| CatalogError::Config(format!("Invalid api_base: {}", e)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                CatalogError::Config(format!("api_base cannot be a base: {}", self.config.api_base))
            })?;
            path.pop_if_empty()
                .extend([
                    "repos",
                    self.config.owner.as_str(),
                    self.config.repository.as_str(),
                    "contents",
                ])
                .extend(self.content_root.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        url.query_pairs_mut().append_pair("ref", &self.config.branch);
        Ok(url)
    }

    /// GET `url`, retrying while rate limited. Returns `None` on 404.
    async fn get(&self, url: Url, accept: &str) -> Result<Option<Response>> {
        let mut attempt = 0;
        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header(ACCEPT, accept)
                .header(USER_AGENT, CLIENT_USER_AGENT);
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("Bearer {}", token));
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                debug!(%url, "Not found");
                return Ok(None);
            }
            if status.is_success() {
                return Ok(Some(response));
            }
            if is_rate_limited(status, response.headers()) && attempt < self.config.max_retries {
                let delay = backoff_delay(
                    response.headers(),
                    self.config.retry_base_delay_ms,
                    attempt,
                );
                warn!(
                    %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(CatalogError::UpstreamUnavailable(format!(
                "GET {} returned {}",
                url, status
            )));
        }
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false)
}

/// `Retry-After` when the server sends one, otherwise `base * 2^attempt`,
/// capped at one minute.
fn backoff_delay(headers: &HeaderMap, base_ms: u64, attempt: u32) -> Duration {
    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let delay = match retry_after {
        Some(secs) => Duration::from_secs(secs),
        None => Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(16))),
    };
    delay.min(Duration::from_secs(MAX_BACKOFF_SECS))
}

#[async_trait]
impl ContentSource for GitHubContentSource {
    async fn list_project_slugs(&self) -> Result<Vec<String>> {
        let url = self.contents_url(&[])?;
        let Some(response) = self.get(url, JSON_MEDIA_TYPE).await? else {
            return Ok(Vec::new());
        };
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<ContentEntry> = serde_json::from_str(&body).map_err(|e| {
            CatalogError::UpstreamUnavailable(format!("Unexpected directory listing: {}", e))
        })?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == "dir")
            .map(|entry| entry.name)
            .collect())
    }

    async fn fetch_file(&self, slug: &str, filename: &str) -> Result<Option<Vec<u8>>> {
        let url = self.contents_url(&[slug, filename])?;
        match self.get(url, RAW_MEDIA_TYPE).await? {
            Some(response) => Ok(Some(response.bytes().await?.to_vec())),
            None => Ok(None),
        }
    }

    async fn project_exists(&self, slug: &str) -> Result<bool> {
        let url = self.contents_url(&[slug])?;
        Ok(self.get(url, JSON_MEDIA_TYPE).await?.is_some())
    }
}
