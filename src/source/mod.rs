//! Content retrieval contracts.
//!
//! Every byte the resolution engine reads (configuration YAML, repository
//! hosted `manifest.json`) comes through a [`ContentSource`]. Multi-tenant
//! callers can hand out a different authenticated source per organization via
//! a [`SourceResolver`]; [`ContentSources`] bundles the default source with an
//! optional resolver.
//!
//! # Components
//!
//! - [`ContentSource`] - `get_content(owner, repo, path, ref)`
//! - [`ContentError`] - failure with a distinguishable "not found"
//! - [`SourceResolver`] - optional per-location source factory
//! - [`github::GithubContentSource`] - GitHub REST implementation

pub mod github;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::RATE_LIMIT_REMAINING_HEADER;
use crate::identifier::Location;

pub use github::GithubContentSource;

/// A file body returned by a content source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// Raw file text
    pub data: String,
    /// Response headers, lower-cased names
    pub headers: HashMap<String, String>,
}

impl Content {
    /// Content with no headers.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            headers: HashMap::new(),
        }
    }

    /// Attach a response header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Remaining API quota reported by the host, when present.
    #[must_use]
    pub fn rate_limit_remaining(&self) -> Option<&str> {
        self.headers.get(RATE_LIMIT_REMAINING_HEADER).map(String::as_str)
    }
}

/// Why a content request failed.
///
/// [`ContentError::NotFound`] is an expected outcome (missing configuration
/// file, plugin without a manifest); every other variant is a transport
/// failure that is logged and then skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The file does not exist (HTTP 404)
    #[error("{path} not found in {owner}/{repo}")]
    NotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// File path inside the repository
        path: String,
    },

    /// The host answered with a non-success status other than 404
    #[error("HTTP {status} while fetching {path}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// File path inside the repository
        path: String,
        /// Response body or reason phrase
        message: String,
    },

    /// The request did not complete in time
    #[error("Timed out while fetching {path}")]
    Timeout {
        /// File path inside the repository
        path: String,
    },

    /// Connection, TLS or body decoding failure
    #[error("Transport error while fetching {path}: {message}")]
    Transport {
        /// File path inside the repository
        path: String,
        /// Underlying error message
        message: String,
    },
}

impl ContentError {
    /// HTTP status associated with the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Transport { .. } => None,
        }
    }

    /// `true` for the expected "file does not exist" outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// `true` when repeating the request may succeed (5xx, 429, timeout, transport).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout { .. } | Self::Transport { .. } => true,
        }
    }
}

/// Reads files from repositories.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw text of `path` in `owner/repo`, at `reference` or the default branch.
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Content, ContentError>;
}

/// Hands out a content source for a specific repository.
///
/// Returning `None` means "use the default source".
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Source to use when reading from `location`.
    async fn resolve(&self, location: &Location) -> Option<Arc<dyn ContentSource>>;
}

/// The default content source plus an optional per-location resolver.
#[derive(Clone)]
pub struct ContentSources {
    default: Arc<dyn ContentSource>,
    resolver: Option<Arc<dyn SourceResolver>>,
}

impl ContentSources {
    /// Use `default` for every location.
    pub fn new(default: Arc<dyn ContentSource>) -> Self {
        Self {
            default,
            resolver: None,
        }
    }

    /// Consult `resolver` first and fall back to the default source.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The fallback source.
    #[must_use]
    pub fn default_source(&self) -> Arc<dyn ContentSource> {
        Arc::clone(&self.default)
    }

    /// Source for `location`: the resolver's answer, or the default source.
    pub async fn for_location(&self, location: &Location) -> Arc<dyn ContentSource> {
        if let Some(resolver) = &self.resolver {
            if let Some(source) = resolver.resolve(location).await {
                return source;
            }
            tracing::debug!(
                owner = %location.owner,
                repo = %location.repo,
                "No dedicated content source for location, using the default one"
            );
        }
        self.default_source()
    }
}
