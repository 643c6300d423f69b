//! GitHub REST content source.
//!
//! Reads repository files through `GET /repos/{owner}/{repo}/contents/{path}`
//! with the raw media type, so the response body is the file itself rather
//! than a base64 JSON envelope.
//!
//! Every request carries the configured timeout. Retryable failures (5xx, 429,
//! timeouts, transport errors) are retried with exponential backoff; a 404 is
//! returned immediately since a missing configuration file is the common case.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use super::{Content, ContentError, ContentSource};
use crate::config::GlobalConfig;
use crate::constants::{BACKOFF_MULTIPLIER, MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::SdkError;
use crate::utils::normalize_base_url;

const GITHUB_RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Content source backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubContentSource {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    max_retries: usize,
}

impl GithubContentSource {
    /// Build a source talking to `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NetworkError`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(
        api_url: &str,
        token: Option<String>,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self, SdkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uos-plugin-sdk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdkError::NetworkError {
                operation: "build GitHub HTTP client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_url: normalize_base_url(api_url),
            token: token.filter(|t| !t.is_empty()),
            max_retries,
        })
    }

    /// Build a source from the `[github]` and `[http]` sections of the global config.
    ///
    /// # Errors
    ///
    /// See [`GithubContentSource::new`].
    pub fn from_config(config: &GlobalConfig) -> Result<Self, SdkError> {
        Self::new(
            &config.github.api_url,
            config.github.token.clone(),
            config.http.timeout(),
            config.http.max_retries,
        )
    }

    /// Base API URL, without trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{owner}/{repo}/contents/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn fetch_once(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Content, ContentError> {
        let mut request = self
            .client
            .get(self.contents_url(owner, repo, path))
            .header(ACCEPT, GITHUB_RAW_MEDIA_TYPE)
            .header(GITHUB_API_VERSION_HEADER, GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(reference) = reference {
            request = request.query(&[("ref", reference)]);
        }

        let response = request.send().await.map_err(|e| transport_error(path, &e))?;
        let status = response.status();
        let headers = collect_headers(response.headers());

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            return Err(ContentError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                message,
            });
        }

        let data = response.text().await.map_err(|e| transport_error(path, &e))?;
        Ok(Content {
            data,
            headers,
        })
    }
}

#[async_trait]
impl ContentSource for GithubContentSource {
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Content, ContentError> {
        RetryIf::start(
            retry_delays(self.max_retries),
            || self.fetch_once(owner, repo, path, reference),
            |error: &ContentError| {
                let retry = error.is_retryable();
                if retry {
                    warn!(owner, repo, path, %error, "Content request failed, retrying");
                }
                retry
            },
        )
        .await
        .inspect_err(|error| {
            if !error.is_not_found() {
                debug!(owner, repo, path, %error, "Content request gave up");
            }
        })
    }
}

/// Delays between attempts: 100ms doubling per retry, capped at 2s.
fn retry_delays(max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(BACKOFF_MULTIPLIER)
        .factor(STARTING_BACKOFF_DELAY_MS / BACKOFF_MULTIPLIER)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
        .take(max_retries)
}

fn transport_error(path: &str, error: &reqwest::Error) -> ContentError {
    if error.is_timeout() {
        ContentError::Timeout {
            path: path.to_string(),
        }
    } else {
        ContentError::Transport {
            path: path.to_string(),
            message: error.to_string(),
        }
    }
}

fn collect_headers(headers: &HeaderMap) -> std::collections::HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}
