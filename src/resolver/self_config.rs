//! Finding a plugin's own entry in a resolved configuration.
//!
//! A running plugin knows its manifest but not the key it was enabled under.
//! Two keys identify it:
//!
//! - its `homepage_url`, for hosted plugins enabled by URL
//! - its `short_name` base, for plugins enabled by repository; the key may
//!   add a `:workflow` segment and an `@ref` suffix
//!
//! `short_name: acme/demo@v2` therefore matches `acme/demo`,
//! `acme/demo:compute.yml` and `acme/demo@main`, but not `acme/demo-extra`.

use regex::Regex;
use serde_json::{Map, Value};

use crate::configuration::ResolvedConfiguration;
use crate::identifier::is_url_plugin;
use crate::manifest::Manifest;
use crate::utils::normalize_base_url;

/// Strip `@version` and `:workflow` from a manifest `short_name`.
fn short_name_base(short_name: &str) -> &str {
    let base = short_name.split('@').next().unwrap_or(short_name);
    base.split(':').next().unwrap_or(base)
}

/// The `with` settings of the entry that belongs to `manifest`.
///
/// A `homepage_url` match takes precedence over a `short_name` match.
/// Returns `None` when no entry matches.
#[must_use]
pub fn find_self_configuration(
    config: &ResolvedConfiguration,
    manifest: &Manifest,
) -> Option<Map<String, Value>> {
    if let Some(homepage) = manifest.homepage_url.as_deref().map(normalize_base_url) {
        if !homepage.is_empty() {
            let by_url = config
                .plugins
                .iter()
                .find(|(key, _)| is_url_plugin(key) && normalize_base_url(key) == homepage);
            if let Some((key, settings)) = by_url {
                tracing::debug!(plugin = %key, "Found self configuration by homepage URL");
                return Some(settings.with.clone());
            }
        }
    }

    let base = short_name_base(manifest.short_name.trim());
    if base.is_empty() {
        return None;
    }
    let pattern = Regex::new(&format!(r"^{}(?::[\w.-]+)?(?:@.+)?$", regex::escape(base))).ok()?;

    config
        .plugins
        .iter()
        .find(|(key, _)| !is_url_plugin(key) && pattern.is_match(key))
        .map(|(key, settings)| {
            tracing::debug!(plugin = %key, "Found self configuration by short name");
            settings.with.clone()
        })
}
