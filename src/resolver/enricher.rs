//! Manifest-driven defaulting of plugin settings.
//!
//! For every plugin entry of a merged configuration:
//!
//! 1. the key is parsed; an invalid key drops the entry from the output
//! 2. the plugin's manifest is fetched; a schema-violating manifest is logged
//!    and treated like a missing one
//! 3. `runsOn` falls back to the manifest listeners when unset or empty, then
//!    to `[]`
//! 4. `skipBotEvents` falls back to the manifest value, then to `true`
//! 5. `with` becomes `{}` when absent
//!
//! Plugins are enriched one after another in key order.

use std::collections::BTreeMap;
use tracing::{debug, error, warn};

use crate::configuration::{
    PluginConfiguration, PluginSettings, ResolvedConfiguration, ResolvedPluginSettings,
};
use crate::identifier::PluginIdentifier;
use crate::manifest::{Manifest, ManifestFetcher};

/// Fills unset plugin settings from plugin manifests.
pub struct PluginEnricher<'a> {
    manifests: &'a ManifestFetcher,
}

impl<'a> PluginEnricher<'a> {
    /// An enricher fetching manifests through `manifests`.
    #[must_use]
    pub const fn new(manifests: &'a ManifestFetcher) -> Self {
        Self {
            manifests,
        }
    }

    /// Resolve every plugin entry of `config`.
    pub async fn enrich(&self, config: PluginConfiguration) -> ResolvedConfiguration {
        let mut plugins = BTreeMap::new();

        for (key, settings) in config.plugins {
            let plugin = match PluginIdentifier::parse(&key) {
                Ok(plugin) => plugin,
                Err(err) => {
                    error!(plugin = %key, error = %err, "Invalid plugin identifier, skipping");
                    continue;
                }
            };

            let manifest = match self.manifests.get_manifest(&plugin).await {
                Ok(manifest) => manifest,
                Err(err) => {
                    warn!(plugin = %key, error = %err, "Ignoring invalid manifest");
                    None
                }
            };
            if manifest.is_none() {
                debug!(plugin = %key, "No manifest, using default settings");
            }

            plugins.insert(key, resolve_settings(settings, manifest.as_deref()));
        }

        ResolvedConfiguration {
            plugins,
            extra: config.extra,
        }
    }
}

/// Combine a plugin's own settings with its manifest defaults.
#[must_use]
pub fn resolve_settings(
    settings: Option<PluginSettings>,
    manifest: Option<&Manifest>,
) -> ResolvedPluginSettings {
    let PluginSettings {
        with,
        runs_on,
        skip_bot_events,
    } = settings.unwrap_or_default();

    let runs_on = runs_on
        .filter(|events| !events.is_empty())
        .or_else(|| manifest.map(|m| m.listeners.clone()))
        .unwrap_or_default();
    let skip_bot_events = skip_bot_events
        .or_else(|| manifest.and_then(|m| m.skip_bot_events))
        .unwrap_or(true);

    ResolvedPluginSettings {
        with,
        runs_on,
        skip_bot_events,
    }
}
