//! URL helpers for hosted plugins and API endpoints.

use crate::constants::MANIFEST_FILE;

/// Strip surrounding whitespace and every trailing `/` from a base URL.
///
/// ```rust
/// use uos_plugin_sdk::utils::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://plugin.example.com//"), "https://plugin.example.com");
/// ```
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Where the manifest of a URL plugin lives.
///
/// `<base>/manifest.json` for a plain base URL; a URL that already points at a
/// `.json` document is used as is.
#[must_use]
pub fn manifest_url(base: &str) -> String {
    let base = normalize_base_url(base);
    if base.to_ascii_lowercase().ends_with(".json") {
        base
    } else {
        format!("{base}/{MANIFEST_FILE}")
    }
}
