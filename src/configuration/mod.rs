//! Plugin configuration documents.
//!
//! A repository enables plugins through a YAML document such as:
//!
//! ```yaml
//! imports:
//!   - acme/shared-config
//! plugins:
//!   acme/command-start-stop@v1:
//!     with:
//!       maxConcurrentTasks: 3
//!     runsOn: ["issue_comment.created"]
//!   https://plugin.example.com:
//! ```
//!
//! The pipeline that turns such documents into a [`ResolvedConfiguration`]:
//!
//! 1. [`loader`] downloads the raw text from the first existing candidate path
//! 2. [`yaml`] parses it into a JSON tree
//! 3. [`schema`] fills defaults, validates and decodes a [`PluginConfiguration`]
//! 4. [`imports`] recursively resolves `imports` and folds them with [`merge`]
//!
//! Enrichment with manifest defaults happens later, in [`crate::resolver`].

pub mod imports;
pub mod loader;
pub mod merge;
pub mod schema;
pub mod yaml;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::SdkError;
use crate::identifier::Location;

pub use imports::{ImportResolver, ImportState};
pub use loader::{DocumentLoader, candidate_paths};
pub use merge::merge_configurations;
pub use schema::{Validated, validate_and_decode};
pub use yaml::{ParsedYaml, parse_yaml};

/// Settings of one plugin inside a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    /// Plugin inputs, passed through verbatim
    #[serde(default)]
    pub with: Map<String, Value>,

    /// Webhook events the plugin runs on (`issues.opened`, `push`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_on: Option<Vec<String>>,

    /// Whether events sent by bots are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_bot_events: Option<bool>,
}

/// One decoded configuration document.
///
/// A `None` plugin entry is a key with an empty body in YAML: the plugin is
/// enabled with default settings. Unknown top-level keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfiguration {
    /// Repositories whose configuration is merged underneath this one.
    ///
    /// Only meaningful while imports are being resolved; always `None` on
    /// documents handed out by the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,

    /// Plugin key (identifier or URL) to settings
    #[serde(default)]
    pub plugins: BTreeMap<String, Option<PluginSettings>>,

    /// Passthrough keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginConfiguration {
    /// Drop the resolution-time `imports` list.
    #[must_use]
    pub fn without_imports(mut self) -> Self {
        self.imports = None;
        self
    }
}

/// Fully resolved settings of one plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPluginSettings {
    /// Plugin inputs, `{}` when the document had none
    pub with: Map<String, Value>,
    /// Events the plugin runs on, defaulted from the manifest listeners
    pub runs_on: Vec<String>,
    /// Defaulted from the manifest, `true` when unknown
    pub skip_bot_events: bool,
}

/// The configuration a repository ends up with after imports, org/repo
/// merging and manifest enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    /// Every plugin with a valid key, fully defaulted
    pub plugins: BTreeMap<String, ResolvedPluginSettings>,

    /// Passthrough keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A problem found while reading one configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConfigurationIssue {
    /// The text is not valid YAML
    Yaml {
        /// Parser message
        message: String,
        /// 1-based line, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
        /// 1-based column, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        column: Option<usize>,
    },
    /// The document does not match the configuration schema
    Schema {
        /// JSON pointer of the offending value (`/plugins/acme~1demo/runsOn`)
        path: String,
        /// What is wrong with it
        message: String,
    },
}

impl fmt::Display for ConfigurationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml {
                message,
                line: Some(line),
                column,
            } => {
                write!(f, "YAML error at line {line}")?;
                if let Some(column) = column {
                    write!(f, ", column {column}")?;
                }
                write!(f, ": {message}")
            }
            Self::Yaml {
                message,
                ..
            } => write!(f, "YAML error: {message}"),
            Self::Schema {
                path,
                message,
            } => {
                let path = if path.is_empty() { "/" } else { path };
                write!(f, "{path}: {message}")
            }
        }
    }
}

/// Outcome of reading one repository's configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResult {
    /// The resolved document (imports merged in), `None` when absent or unusable
    pub config: Option<PluginConfiguration>,
    /// Parse or validation problems of the repository's own document
    pub errors: Option<Vec<ConfigurationIssue>>,
    /// The downloaded text, when a file was found
    pub raw_data: Option<String>,
}

impl ConfigurationResult {
    /// The issues of the document read from `location`, as an error.
    ///
    /// Returns `None` when the document parsed and validated, or was absent.
    #[must_use]
    pub fn validation_error(&self, location: &Location) -> Option<SdkError> {
        let issues = self.errors.as_ref().filter(|issues| !issues.is_empty())?;
        Some(SdkError::ConfigurationInvalid {
            location: location.to_string(),
            errors: issues.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plugin_settings_wire_names() {
        let settings: PluginSettings = serde_json::from_value(json!({
            "with": {"a": 1},
            "runsOn": ["issues.opened"],
            "skipBotEvents": false
        }))
        .unwrap();
        assert_eq!(settings.runs_on, Some(vec!["issues.opened".to_string()]));
        assert_eq!(settings.skip_bot_events, Some(false));

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["runsOn"], json!(["issues.opened"]));
    }

    #[test]
    fn test_configuration_keeps_extra_keys() {
        let config: PluginConfiguration = serde_json::from_value(json!({
            "plugins": {"acme/demo": null},
            "incentives": {"enabled": true}
        }))
        .unwrap();
        assert_eq!(config.plugins.get("acme/demo"), Some(&None));
        assert_eq!(config.extra["incentives"], json!({"enabled": true}));
        assert!(config.imports.is_none());
    }

    #[test]
    fn test_issue_display() {
        let issue = ConfigurationIssue::Schema {
            path: "/plugins".to_string(),
            message: "expected a mapping".to_string(),
        };
        assert_eq!(issue.to_string(), "/plugins: expected a mapping");

        let issue = ConfigurationIssue::Yaml {
            message: "bad indentation".to_string(),
            line: Some(3),
            column: Some(5),
        };
        assert_eq!(issue.to_string(), "YAML error at line 3, column 5: bad indentation");
    }

    #[test]
    fn test_validation_error_lists_issues() {
        let location = Location::new("acme", "demo");
        assert!(ConfigurationResult::default().validation_error(&location).is_none());

        let result = ConfigurationResult {
            errors: Some(vec![
                ConfigurationIssue::Schema {
                    path: "/plugins".to_string(),
                    message: "expected a mapping".to_string(),
                },
                ConfigurationIssue::Yaml {
                    message: "tab character".to_string(),
                    line: None,
                    column: None,
                },
            ]),
            ..ConfigurationResult::default()
        };
        match result.validation_error(&location) {
            Some(SdkError::ConfigurationInvalid { location, errors }) => {
                assert_eq!(location, "acme/demo");
                assert_eq!(errors, vec!["/plugins: expected a mapping", "YAML error: tab character"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
