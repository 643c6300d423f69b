//! In-memory content sources.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::identifier::Location;
use crate::source::{Content, ContentError, ContentSource, SourceResolver};

#[derive(Clone)]
enum Entry {
    Found(Content),
    Failed(ContentError),
}

#[derive(Default)]
struct MockState {
    files: HashMap<String, Entry>,
    calls: Vec<String>,
    latency: Option<Duration>,
}

/// A [`ContentSource`] serving files registered up front.
///
/// Clones share files and counters, so a test can keep one handle for
/// assertions and give another to the code under test. Unregistered paths
/// answer 404. A file registered without a ref is served for every ref.
#[derive(Clone, Default)]
pub struct MockContentSource {
    state: Arc<Mutex<MockState>>,
}

fn file_key(owner: &str, repo: &str, path: &str, reference: Option<&str>) -> String {
    match reference {
        Some(reference) => format!("{owner}/{repo}:{path}@{reference}"),
        None => format!("{owner}/{repo}:{path}"),
    }
}

impl MockContentSource {
    /// A source with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(self, key: String, entry: Entry) -> Self {
        self.lock().files.insert(key, entry);
        self
    }

    /// Serve `data` for `path` in `owner/repo` at any ref.
    #[must_use]
    pub fn with_file(self, owner: &str, repo: &str, path: &str, data: &str) -> Self {
        self.insert(file_key(owner, repo, path, None), Entry::Found(Content::new(data)))
    }

    /// Serve `data` for `path` in `owner/repo` at `reference` only.
    #[must_use]
    pub fn with_file_at_ref(
        self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
        data: &str,
    ) -> Self {
        self.insert(file_key(owner, repo, path, Some(reference)), Entry::Found(Content::new(data)))
    }

    /// Serve a full [`Content`] (with headers) for `path`.
    #[must_use]
    pub fn with_content(self, owner: &str, repo: &str, path: &str, content: Content) -> Self {
        self.insert(file_key(owner, repo, path, None), Entry::Found(content))
    }

    /// Answer `path` with HTTP `status`.
    #[must_use]
    pub fn with_failure(self, owner: &str, repo: &str, path: &str, status: u16) -> Self {
        let error = if status == 404 {
            ContentError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                path: path.to_string(),
            }
        } else {
            ContentError::Status {
                status,
                path: path.to_string(),
                message: format!("injected status {status}"),
            }
        };
        self.insert(file_key(owner, repo, path, None), Entry::Failed(error))
    }

    /// Answer `path` with a timeout.
    #[must_use]
    pub fn with_timeout(self, owner: &str, repo: &str, path: &str) -> Self {
        self.insert(
            file_key(owner, repo, path, None),
            Entry::Failed(ContentError::Timeout {
                path: path.to_string(),
            }),
        )
    }

    /// Sleep for `latency` before every answer.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Total number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Requests received for `path` in `owner/repo`, any ref.
    #[must_use]
    pub fn calls_for(&self, owner: &str, repo: &str, path: &str) -> usize {
        let prefix = file_key(owner, repo, path, None);
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                call.strip_prefix(&prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('@'))
            })
            .count()
    }

    /// Every request received, as `owner/repo:path[@ref]`, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Content, ContentError> {
        let (entry, latency) = {
            let mut state = self.lock();
            state.calls.push(file_key(owner, repo, path, reference));
            let entry = state
                .files
                .get(&file_key(owner, repo, path, reference))
                .or_else(|| state.files.get(&file_key(owner, repo, path, None)))
                .cloned();
            (entry, state.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match entry {
            Some(Entry::Found(content)) => Ok(content),
            Some(Entry::Failed(error)) => Err(error),
            None => Err(ContentError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                path: path.to_string(),
            }),
        }
    }
}

/// A [`SourceResolver`] with a fixed table of per-location sources.
#[derive(Clone, Default)]
pub struct StaticSourceResolver {
    sources: HashMap<String, Arc<dyn ContentSource>>,
    lookups: Arc<Mutex<usize>>,
}

impl StaticSourceResolver {
    /// A resolver that knows no locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `source` for `owner/repo`.
    #[must_use]
    pub fn with_source(mut self, owner: &str, repo: &str, source: Arc<dyn ContentSource>) -> Self {
        self.sources.insert(Location::new(owner, repo).key(), source);
        self
    }

    /// Number of `resolve` calls so far.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        *self.lookups.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SourceResolver for StaticSourceResolver {
    async fn resolve(&self, location: &Location) -> Option<Arc<dyn ContentSource>> {
        *self.lookups.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
        self.sources.get(&location.key()).cloned()
    }
}
