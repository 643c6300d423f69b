//! Manifest retrieval with caching and in-flight deduplication.
//!
//! Each manifest key moves through two states in one [`DashMap`]:
//!
//! - `Pending(shared)` while a request is outstanding; concurrent callers
//!   clone and await the same [`Shared`] future instead of issuing their own
//! - `Ready(manifest)` once a manifest decoded successfully; kept for the
//!   lifetime of the fetcher
//!
//! A request that ends without a manifest (not found, transport failure,
//! malformed JSON, schema violation) removes its `Pending` entry, so the next
//! caller tries again. State transitions go through the `DashMap` entry API,
//! which makes "check cache, join in-flight or register" atomic on a
//! multi-threaded runtime.
//!
//! Cache keys are `owner:repo[:ref]` for repository manifests and the
//! manifest URL for hosted plugins.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Manifest, decode_manifest};
use crate::constants::MANIFEST_FILE;
use crate::core::SdkError;
use crate::identifier::{GithubPlugin, PluginIdentifier};
use crate::source::{ContentError, ContentSources};
use crate::utils::manifest_url;

/// What [`ManifestFetcher::get_manifest`] resolves to.
///
/// `Ok(None)` is "no usable manifest"; `Err` is reserved for manifests that
/// were fetched but violate the schema.
pub type ManifestResult = Result<Option<Arc<Manifest>>, Arc<SdkError>>;

type SharedFetch = Shared<BoxFuture<'static, ManifestResult>>;

enum ManifestState {
    Pending(SharedFetch),
    Ready(Arc<Manifest>),
}

/// Where a manifest comes from.
#[derive(Debug, Clone)]
enum ManifestRequest {
    Repository(GithubPlugin),
    Url(String),
}

/// Fetches plugin manifests from repositories and URLs.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct ManifestFetcher {
    sources: ContentSources,
    client: reqwest::Client,
    manifests: Arc<DashMap<String, ManifestState>>,
}

impl ManifestFetcher {
    /// A fetcher reading repository manifests through `sources` and hosted
    /// manifests with `client`.
    ///
    /// The client should carry a timeout; a hung request otherwise stalls
    /// every caller waiting on the same manifest.
    #[must_use]
    pub fn new(sources: ContentSources, client: reqwest::Client) -> Self {
        Self {
            sources,
            client,
            manifests: Arc::new(DashMap::new()),
        }
    }

    /// The client used for hosted manifests.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Cache key of `plugin`'s manifest.
    #[must_use]
    pub fn cache_key(plugin: &PluginIdentifier) -> String {
        match plugin {
            PluginIdentifier::Github(plugin) => plugin.manifest_key(),
            PluginIdentifier::Url {
                url,
            } => manifest_url(url),
        }
    }

    /// Whether a decoded manifest for `plugin` is cached.
    #[must_use]
    pub fn is_cached(&self, plugin: &PluginIdentifier) -> bool {
        self.manifests
            .get(&Self::cache_key(plugin))
            .is_some_and(|state| matches!(state.value(), ManifestState::Ready(_)))
    }

    /// Number of requests currently outstanding.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.manifests.iter().filter(|state| matches!(state.value(), ManifestState::Pending(_))).count()
    }

    /// The manifest of `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidManifest`] when the manifest was found but
    /// does not satisfy the schema. Every other failure is logged and
    /// reported as `Ok(None)`.
    pub async fn get_manifest(&self, plugin: &PluginIdentifier) -> ManifestResult {
        let key = Self::cache_key(plugin);

        let pending = match self.manifests.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                ManifestState::Ready(manifest) => {
                    debug!(plugin = %plugin, "Manifest served from cache");
                    return Ok(Some(Arc::clone(manifest)));
                }
                ManifestState::Pending(shared) => {
                    debug!(plugin = %plugin, "Joining in-flight manifest request");
                    shared.clone()
                }
            },
            Entry::Vacant(entry) => {
                let request = match plugin {
                    PluginIdentifier::Github(plugin) => ManifestRequest::Repository(plugin.clone()),
                    PluginIdentifier::Url {
                        ..
                    } => ManifestRequest::Url(key.clone()),
                };
                let shared = fetch(self.sources.clone(), self.client.clone(), request, plugin.to_string())
                    .boxed()
                    .shared();
                entry.insert(ManifestState::Pending(shared.clone()));
                shared
            }
        };

        let result = pending.clone().await;
        self.settle(&key, &pending, &result);
        result
    }

    /// Replace our `Pending` entry with the outcome. Entries registered by a
    /// newer request are left alone.
    fn settle(&self, key: &str, pending: &SharedFetch, result: &ManifestResult) {
        if let Entry::Occupied(mut entry) = self.manifests.entry(key.to_string()) {
            let ours = matches!(entry.get(), ManifestState::Pending(shared) if shared.ptr_eq(pending));
            if !ours {
                return;
            }
            match result {
                Ok(Some(manifest)) => {
                    entry.insert(ManifestState::Ready(Arc::clone(manifest)));
                }
                Ok(None) | Err(_) => {
                    entry.remove();
                }
            }
        }
    }
}

async fn fetch(
    sources: ContentSources,
    client: reqwest::Client,
    request: ManifestRequest,
    label: String,
) -> ManifestResult {
    let body = match &request {
        ManifestRequest::Repository(plugin) => fetch_from_repository(&sources, plugin).await,
        ManifestRequest::Url(url) => fetch_from_url(&client, url).await,
    };
    let Some(body) = body else {
        return Ok(None);
    };

    match decode_manifest(&label, &body) {
        Ok(manifest) => {
            debug!(plugin = %label, short_name = %manifest.short_name, "Manifest decoded");
            Ok(Some(Arc::new(manifest)))
        }
        Err(err @ SdkError::InvalidManifest { .. }) => {
            warn!(plugin = %label, error = %err, "Manifest failed validation");
            Err(Arc::new(err))
        }
        Err(err) => {
            warn!(plugin = %label, error = %err, "Manifest could not be decoded");
            Ok(None)
        }
    }
}

async fn fetch_from_repository(sources: &ContentSources, plugin: &GithubPlugin) -> Option<String> {
    let source = sources.for_location(&plugin.location()).await;
    match source
        .get_content(&plugin.owner, &plugin.repo, MANIFEST_FILE, plugin.reference.as_deref())
        .await
    {
        Ok(content) => Some(content.data),
        Err(ContentError::NotFound {
            ..
        }) => {
            debug!(plugin = %plugin, "Plugin repository has no manifest");
            None
        }
        Err(err) => {
            warn!(plugin = %plugin, error = %err, "Could not fetch plugin manifest");
            None
        }
    }
}

async fn fetch_from_url(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(url, error = %err, "Could not fetch plugin manifest");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(url, status = status.as_u16(), "Plugin manifest request was not successful");
        return None;
    }

    match response.text().await {
        Ok(body) => Some(body),
        Err(err) => {
            warn!(url, error = %err, "Could not read plugin manifest body");
            None
        }
    }
}
