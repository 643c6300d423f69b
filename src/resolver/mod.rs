//! Configuration resolution engine.
//!
//! [`ConfigurationHandler`] is the entry point of the SDK. For a repository
//! `owner/repo` it:
//!
//! 1. reads the organization configuration from `owner/.ubiquity-os`
//! 2. reads the repository configuration from `owner/repo`
//! 3. resolves the imports of both (see [`crate::configuration::imports`])
//! 4. merges them, repository over organization
//! 5. enriches every plugin with its manifest defaults ([`enricher`])
//!
//! Nothing that goes wrong with a single source aborts a resolution: missing
//! files, malformed YAML, invalid documents, unreachable manifests and bad
//! plugin keys are logged and skipped, and a configuration is always returned.
//!
//! # Example
//!
//! ```rust,no_run
//! use uos_plugin_sdk::config::GlobalConfig;
//! use uos_plugin_sdk::identifier::Location;
//! use uos_plugin_sdk::resolver::ConfigurationHandler;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?.apply_env_overrides();
//! let handler = ConfigurationHandler::from_config(&config)?;
//!
//! let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;
//! for (plugin, settings) in &resolved.plugins {
//!     println!("{plugin}: {:?}", settings.runs_on);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Sharing
//!
//! The manifest cache lives as long as the handler and is shared by
//! concurrent resolutions; import bookkeeping is private to each call.

pub mod enricher;
pub mod self_config;

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::configuration::{
    ConfigurationResult, DocumentLoader, ImportResolver, ResolvedConfiguration,
    merge_configurations, schema,
};
use crate::constants::{CONFIG_ORG_REPO, DEFAULT_HTTP_TIMEOUT};
use crate::core::SdkError;
use crate::identifier::{Location, PluginIdentifier};
use crate::manifest::{Manifest, ManifestFetcher, fetcher::ManifestResult};
use crate::source::{ContentSource, ContentSources, GithubContentSource, SourceResolver};

pub use enricher::PluginEnricher;
pub use self_config::find_self_configuration;

/// Resolves repository configuration into the set of plugins to run.
#[derive(Clone)]
pub struct ConfigurationHandler {
    sources: ContentSources,
    loader: DocumentLoader,
    manifests: ManifestFetcher,
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, SdkError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("uos-plugin-sdk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SdkError::NetworkError {
            operation: "build manifest HTTP client".to_string(),
            reason: e.to_string(),
        })
}

impl ConfigurationHandler {
    /// A handler reading every repository through `source` for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NetworkError`] if the HTTP client for hosted
    /// manifests cannot be built.
    pub fn new(
        source: Arc<dyn ContentSource>,
        environment: impl Into<String>,
    ) -> Result<Self, SdkError> {
        Ok(Self::with_sources(
            ContentSources::new(source),
            environment,
            http_client(DEFAULT_HTTP_TIMEOUT)?,
        ))
    }

    /// A handler with full control over content sources and the HTTP client
    /// used for hosted manifests.
    #[must_use]
    pub fn with_sources(
        sources: ContentSources,
        environment: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            manifests: ManifestFetcher::new(sources.clone(), client),
            loader: DocumentLoader::new(environment),
            sources,
        }
    }

    /// A handler backed by the GitHub REST API as configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::NetworkError`] if an HTTP client cannot be built.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, SdkError> {
        let source = GithubContentSource::from_config(config)?;
        Ok(Self::with_sources(
            ContentSources::new(Arc::new(source)),
            config.environment.clone(),
            http_client(config.http.timeout())?,
        ))
    }

    /// Consult `resolver` for a per-location content source.
    ///
    /// Drops manifests cached so far, since they may have been read through
    /// a different source.
    #[must_use]
    pub fn with_source_resolver(self, resolver: Arc<dyn SourceResolver>) -> Self {
        let sources = self.sources.with_resolver(resolver);
        Self {
            manifests: ManifestFetcher::new(sources.clone(), self.manifests.client().clone()),
            loader: self.loader,
            sources,
        }
    }

    /// The environment whose configuration files are read.
    #[must_use]
    pub fn environment(&self) -> &str {
        self.loader.environment()
    }

    /// The manifest fetcher, shared by every resolution of this handler.
    #[must_use]
    pub const fn manifests(&self) -> &ManifestFetcher {
        &self.manifests
    }

    /// Resolved configuration for `location`.
    ///
    /// Without a location, the schema defaults are returned and no request
    /// is made.
    pub async fn get_configuration(&self, location: Option<&Location>) -> ResolvedConfiguration {
        let mut merged = schema::default_configuration();

        let Some(location) = location else {
            debug!("No location was provided, using the default configuration");
            return ResolvedConfiguration {
                extra: merged.extra,
                ..ResolvedConfiguration::default()
            };
        };

        debug!(
            org_repo = %format!("{}/{CONFIG_ORG_REPO}", location.owner),
            repo = %location,
            "Fetching configurations from the organization and repository"
        );

        let org = self.get_configuration_from_repo(&location.owner, CONFIG_ORG_REPO).await;
        let repo = self.get_configuration_from_repo(&location.owner, &location.repo).await;

        if let Some(config) = org.config {
            merged = merge_configurations(merged, config);
        }
        if let Some(config) = repo.config {
            merged = merge_configurations(merged, config);
        }

        debug!(repo = %location, plugins = merged.plugins.len(), "Found plugins enabled");
        PluginEnricher::new(&self.manifests).enrich(merged).await
    }

    /// Configuration of a single repository with its imports merged in.
    ///
    /// The returned document has no `imports` and is not enriched.
    pub async fn get_configuration_from_repo(&self, owner: &str, repo: &str) -> ConfigurationResult {
        ImportResolver::new(&self.sources, &self.loader).get_configuration_from_repo(owner, repo).await
    }

    /// The `with` settings a plugin described by `manifest` was enabled with
    /// at `location`, `None` when it is not enabled there.
    pub async fn get_self_configuration(
        &self,
        manifest: &Manifest,
        location: Option<&Location>,
    ) -> Option<Map<String, Value>> {
        let config = self.get_configuration(location).await;
        find_self_configuration(&config, manifest)
    }

    /// The manifest of `plugin`, cached for the lifetime of the handler.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidManifest`] when the manifest violates the schema.
    pub async fn get_manifest(&self, plugin: &PluginIdentifier) -> ManifestResult {
        self.manifests.get_manifest(plugin).await
    }
}
