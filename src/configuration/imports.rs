//! Recursive `imports` resolution.
//!
//! A configuration document can pull in the configuration of other
//! repositories:
//!
//! ```yaml
//! imports:
//!   - acme/shared-config
//!   - acme/security-defaults
//! plugins:
//!   acme/command-start-stop:
//! ```
//!
//! Imports are resolved depth-first in declaration order, each one with its
//! own imports already merged in. The imported configurations are folded
//! left to right and the importing document is merged last, so local entries
//! override imported ones.
//!
//! # Termination
//!
//! One [`ImportState`] is shared by a whole top-level resolution:
//!
//! - a location already being resolved higher up the chain is a cycle and
//!   contributes nothing (this includes a document importing itself)
//! - imports nested deeper than [`MAX_IMPORT_DEPTH`] are ignored
//! - every location is downloaded at most once; failures are cached as `None`
//!
//! Siblings are resolved sequentially, which keeps log order and cache
//! population deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    ConfigurationResult, DocumentLoader, PluginConfiguration, merge_configurations, parse_yaml,
    validate_and_decode,
};
use crate::constants::MAX_IMPORT_DEPTH;
use crate::identifier::Location;
use crate::source::{ContentSource, ContentSources};

/// Bookkeeping of one top-level resolution.
///
/// Created fresh for every [`ImportResolver::get_configuration_from_repo`]
/// call and dropped when it returns; never shared between resolutions.
#[derive(Default)]
pub struct ImportState {
    cache: HashMap<String, Option<PluginConfiguration>>,
    in_flight: HashSet<String>,
    sources: HashMap<String, Arc<dyn ContentSource>>,
}

impl ImportState {
    /// An empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `location` has a cached result (possibly `None`).
    #[must_use]
    pub fn is_cached(&self, location: &Location) -> bool {
        self.cache.contains_key(&location.key())
    }

    /// Whether `location` is currently being resolved.
    #[must_use]
    pub fn is_in_flight(&self, location: &Location) -> bool {
        self.in_flight.contains(&location.key())
    }

    /// Number of locations resolved so far.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Resolves configuration documents together with their imports.
pub struct ImportResolver<'a> {
    sources: &'a ContentSources,
    loader: &'a DocumentLoader,
}

impl<'a> ImportResolver<'a> {
    /// A resolver reading through `sources` with `loader`.
    #[must_use]
    pub const fn new(sources: &'a ContentSources, loader: &'a DocumentLoader) -> Self {
        Self {
            sources,
            loader,
        }
    }

    /// Read the configuration of `owner/repo` with all of its imports merged in.
    ///
    /// `errors` and `raw_data` describe the repository's own document; problems
    /// in imported documents are only logged.
    pub async fn get_configuration_from_repo(&self, owner: &str, repo: &str) -> ConfigurationResult {
        let location = Location::new(owner, repo);
        let mut state = ImportState::new();

        state.in_flight.insert(location.key());
        let result = self.load(&location, &mut state, 0).await;
        state.in_flight.remove(&location.key());

        debug!(
            owner,
            repo,
            locations = state.cached_len(),
            found = result.config.is_some(),
            "Configuration resolved"
        );
        result
    }

    /// Resolve one imported location at `depth` (the root document is depth 0).
    ///
    /// Returns `None` for cycles, for imports nested too deep, and for
    /// locations without a usable document. The result is cached in `state`.
    pub async fn resolve_imported_configuration(
        &self,
        location: &Location,
        state: &mut ImportState,
        depth: usize,
    ) -> Option<PluginConfiguration> {
        let key = location.key();

        if let Some(cached) = state.cache.get(&key) {
            debug!(location = %location, depth, "Import served from cache");
            return cached.clone();
        }

        if state.in_flight.contains(&key) {
            warn!(location = %location, depth, "Import cycle detected, skipping");
            return None;
        }

        if depth > MAX_IMPORT_DEPTH {
            warn!(
                location = %location,
                depth,
                max_depth = MAX_IMPORT_DEPTH,
                "Import depth limit exceeded, skipping"
            );
            return None;
        }

        state.in_flight.insert(key.clone());
        let config = self.load(location, state, depth).await.config;
        state.in_flight.remove(&key);

        state.cache.insert(key, config.clone());
        config
    }

    async fn load(
        &self,
        location: &Location,
        state: &mut ImportState,
        depth: usize,
    ) -> ConfigurationResult {
        let source = self.source_for(location, state).await;
        let Some(raw) = self.loader.download(source.as_ref(), &location.owner, &location.repo).await
        else {
            debug!(location = %location, depth, "No raw configuration data");
            return ConfigurationResult::default();
        };

        let parsed = parse_yaml(Some(&raw));
        let Some(mut document) = parsed.document else {
            if parsed.errors.is_some() {
                warn!(location = %location, depth, "Configuration YAML could not be decoded");
            }
            return ConfigurationResult {
                config: None,
                errors: parsed.errors,
                raw_data: Some(raw),
            };
        };

        let imports = take_imports(&mut document, location);

        let validated = validate_and_decode(&document);
        let Some(local) = validated.value else {
            warn!(location = %location, depth, "Configuration is invalid and will be ignored");
            return ConfigurationResult {
                config: None,
                errors: Some(validated.errors),
                raw_data: Some(raw),
            };
        };

        let mut merged: Option<PluginConfiguration> = None;
        for import in &imports {
            debug!(location = %location, import = %import, depth, "Resolving import");
            if let Some(imported) =
                Box::pin(self.resolve_imported_configuration(import, state, depth + 1)).await
            {
                merged = Some(match merged {
                    Some(acc) => merge_configurations(acc, imported),
                    None => imported,
                });
            }
        }

        let config = match merged {
            Some(imported) => merge_configurations(imported, local),
            None => local,
        };

        ConfigurationResult {
            config: Some(config.without_imports()),
            errors: None,
            raw_data: Some(raw),
        }
    }

    async fn source_for(
        &self,
        location: &Location,
        state: &mut ImportState,
    ) -> Arc<dyn ContentSource> {
        let key = location.key();
        if let Some(source) = state.sources.get(&key) {
            return Arc::clone(source);
        }
        let source = self.sources.for_location(location).await;
        state.sources.insert(key, Arc::clone(&source));
        source
    }
}

/// Remove `imports` from `document` and return the parsed locations.
///
/// Entries are trimmed, invalid ones dropped with a warning and duplicates
/// removed keeping the first occurrence.
fn take_imports(document: &mut serde_json::Value, location: &Location) -> Vec<Location> {
    let Some(raw_imports) = document.as_object_mut().and_then(|root| root.remove("imports")) else {
        return Vec::new();
    };

    let Some(entries) = raw_imports.as_array() else {
        warn!(location = %location, "'imports' is not a sequence, ignoring it");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut imports = Vec::with_capacity(entries.len());
    for entry in entries {
        let parsed = entry.as_str().map(Location::parse);
        match parsed {
            Some(Ok(import)) => {
                if seen.insert(import.key()) {
                    imports.push(import);
                }
            }
            _ => warn!(location = %location, entry = %entry, "Invalid import entry, ignoring it"),
        }
    }
    imports
}
