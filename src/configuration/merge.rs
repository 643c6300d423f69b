//! Right-biased configuration merge.

use super::PluginConfiguration;

/// Merge `overlay` on top of `base`.
///
/// Top-level keys are merged shallowly with `overlay` winning. `plugins` is
/// merged per plugin key: an entry in `overlay` replaces the whole entry in
/// `base`, entries present on one side only pass through.
///
/// Later documents always win, so callers apply merges in a fixed order:
/// imports before the importing document, organization before repository.
///
/// # Examples
///
/// ```rust
/// use uos_plugin_sdk::configuration::{PluginConfiguration, merge_configurations};
///
/// let org: PluginConfiguration =
///     serde_json::from_value(serde_json::json!({"plugins": {"a/b": {"with": {"x": 1}}}})).unwrap();
/// let repo: PluginConfiguration =
///     serde_json::from_value(serde_json::json!({"plugins": {"a/b": {"with": {"x": 2}}}})).unwrap();
///
/// let merged = merge_configurations(org, repo);
/// assert_eq!(merged.plugins["a/b"].as_ref().unwrap().with["x"], 2);
/// ```
#[must_use]
pub fn merge_configurations(
    base: PluginConfiguration,
    overlay: PluginConfiguration,
) -> PluginConfiguration {
    let PluginConfiguration {
        imports,
        mut plugins,
        mut extra,
    } = base;

    plugins.extend(overlay.plugins);
    extra.extend(overlay.extra);

    PluginConfiguration {
        imports: overlay.imports.or(imports),
        plugins,
        extra,
    }
}
