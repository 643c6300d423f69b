//! Plugin manifests.
//!
//! Every plugin publishes a `manifest.json` describing itself, either at the
//! root of its repository or at `<base-url>/manifest.json` for hosted plugins:
//!
//! ```json
//! {
//!   "name": "Start | Stop",
//!   "short_name": "ubiquity-os/command-start-stop@development",
//!   "homepage_url": "https://command-start-stop.ubiquity.workers.dev",
//!   "ubiquity:listeners": ["issue_comment.created", "issues.assigned"],
//!   "skipBotEvents": true,
//!   "commands": {"start": {"description": "Assign yourself"}}
//! }
//! ```
//!
//! The listeners and `skipBotEvents` become the defaults of the plugin's
//! settings during enrichment. Fetching and caching live in [`fetcher`].

pub mod fetcher;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::configuration::schema::is_webhook_event;
use crate::core::SdkError;

pub use fetcher::ManifestFetcher;

/// A validated plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Human readable name
    pub name: String,

    /// `owner/repo[:workflow][@ref]`-like short identifier
    pub short_name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Base URL of a hosted plugin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,

    /// Webhook events the plugin listens to by default
    #[serde(rename = "ubiquity:listeners", default)]
    pub listeners: Vec<String>,

    /// Default for the plugin's `skipBotEvents` setting
    #[serde(rename = "skipBotEvents", default, skip_serializing_if = "Option::is_none")]
    pub skip_bot_events: Option<bool>,

    /// Slash commands the plugin handles
    #[serde(default)]
    pub commands: Map<String, Value>,

    /// JSON schema of the plugin's `with` settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

/// Schema violations of a manifest document, as `/pointer: message` strings.
#[must_use]
pub fn validate_manifest(document: &Value) -> Vec<String> {
    let Some(root) = document.as_object() else {
        return vec!["/: expected an object".to_string()];
    };

    let mut errors = Vec::new();
    for key in ["name", "short_name"] {
        match root.get(key) {
            Some(Value::String(_)) => {}
            Some(_) => errors.push(format!("/{key}: expected a string")),
            None => errors.push(format!("/{key}: required property is missing")),
        }
    }

    for key in ["description", "homepage_url"] {
        if root.get(key).is_some_and(|v| !v.is_string()) {
            errors.push(format!("/{key}: expected a string"));
        }
    }

    match root.get("ubiquity:listeners") {
        None => {}
        Some(Value::Array(listeners)) => {
            for (index, listener) in listeners.iter().enumerate() {
                if !listener.as_str().is_some_and(is_webhook_event) {
                    errors.push(format!(
                        "/ubiquity:listeners/{index}: expected a webhook event name, got {listener}"
                    ));
                }
            }
        }
        Some(_) => errors.push("/ubiquity:listeners: expected an array".to_string()),
    }

    if root.get("skipBotEvents").is_some_and(|v| !v.is_boolean()) {
        errors.push("/skipBotEvents: expected a boolean".to_string());
    }
    if root.get("commands").is_some_and(|v| !v.is_object()) {
        errors.push("/commands: expected an object".to_string());
    }
    if root.get("configuration").is_some_and(|v| !v.is_object()) {
        errors.push("/configuration: expected an object".to_string());
    }

    errors
}

/// Parse and validate a manifest body fetched for `plugin`.
///
/// # Errors
///
/// - [`SdkError::ManifestParseError`] when the body is not JSON
/// - [`SdkError::InvalidManifest`] when it does not satisfy the manifest schema
pub fn decode_manifest(plugin: &str, body: &str) -> Result<Manifest, SdkError> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| SdkError::ManifestParseError {
            plugin: plugin.to_string(),
            reason: e.to_string(),
        })?;

    let errors = validate_manifest(&document);
    if !errors.is_empty() {
        return Err(SdkError::InvalidManifest {
            plugin: plugin.to_string(),
            errors,
        });
    }

    serde_json::from_value(document).map_err(|e| SdkError::InvalidManifest {
        plugin: plugin.to_string(),
        errors: vec![e.to_string()],
    })
}
