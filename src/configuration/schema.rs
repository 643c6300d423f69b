//! Configuration schema: defaults, validation and decoding.
//!
//! The schema of a configuration document:
//!
//! - root: mapping, unknown keys allowed
//! - `imports`: optional sequence of strings
//! - `plugins`: mapping (default `{}`) of plugin key to `null` or settings
//! - settings: `with` mapping (default `{}`), optional `runsOn` sequence of
//!   webhook event names, optional boolean `skipBotEvents`
//!
//! [`validate_and_decode`] applies the defaults first, so a document that is
//! only missing defaultable values still decodes; every remaining issue is
//! logged and makes the decode fail.

use serde_json::{Map, Value};
use tracing::error;

use super::{ConfigurationIssue, PluginConfiguration};

/// GitHub webhook events a plugin can subscribe to.
const WEBHOOK_EVENTS: &[&str] = &[
    "branch_protection_configuration",
    "branch_protection_rule",
    "check_run",
    "check_suite",
    "code_scanning_alert",
    "commit_comment",
    "create",
    "custom_property",
    "custom_property_values",
    "delete",
    "dependabot_alert",
    "deploy_key",
    "deployment",
    "deployment_protection_rule",
    "deployment_review",
    "deployment_status",
    "discussion",
    "discussion_comment",
    "fork",
    "github_app_authorization",
    "gollum",
    "installation",
    "installation_repositories",
    "installation_target",
    "issue_comment",
    "issues",
    "label",
    "marketplace_purchase",
    "member",
    "membership",
    "merge_group",
    "meta",
    "milestone",
    "org_block",
    "organization",
    "package",
    "page_build",
    "personal_access_token_request",
    "ping",
    "project",
    "project_card",
    "project_column",
    "projects_v2",
    "projects_v2_item",
    "projects_v2_status_update",
    "public",
    "pull_request",
    "pull_request_review",
    "pull_request_review_comment",
    "pull_request_review_thread",
    "push",
    "registry_package",
    "release",
    "repository",
    "repository_advisory",
    "repository_dispatch",
    "repository_import",
    "repository_ruleset",
    "repository_vulnerability_alert",
    "secret_scanning_alert",
    "secret_scanning_alert_location",
    "secret_scanning_scan",
    "security_advisory",
    "security_and_analysis",
    "sponsorship",
    "star",
    "status",
    "sub_issues",
    "team",
    "team_add",
    "watch",
    "workflow_dispatch",
    "workflow_job",
    "workflow_run",
];

/// Returns `true` for `event` or `event.action` with a known webhook event.
///
/// ```rust
/// use uos_plugin_sdk::configuration::schema::is_webhook_event;
///
/// assert!(is_webhook_event("issues"));
/// assert!(is_webhook_event("issue_comment.created"));
/// assert!(!is_webhook_event("issues.Opened"));
/// assert!(!is_webhook_event("made_up.created"));
/// ```
#[must_use]
pub fn is_webhook_event(name: &str) -> bool {
    let (event, action) = match name.split_once('.') {
        Some((event, action)) => (event, Some(action)),
        None => (name, None),
    };
    let action_ok = action.is_none_or(|action| {
        !action.is_empty() && action.chars().all(|c| c.is_ascii_lowercase() || c == '_')
    });
    action_ok && WEBHOOK_EVENTS.contains(&event)
}

/// Result of [`validate_and_decode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    /// The decoded document, `None` when validation or decoding failed
    pub value: Option<PluginConfiguration>,
    /// Every issue found after defaults were applied
    pub errors: Vec<ConfigurationIssue>,
}

/// The configuration used when nothing else is available.
#[must_use]
pub fn default_configuration() -> PluginConfiguration {
    PluginConfiguration::default()
}

/// Fill schema defaults in place.
///
/// `plugins` becomes `{}` when absent and every mapping plugin entry gets
/// `with: {}`. Non-mapping values are left for validation to report.
pub fn apply_defaults(document: &mut Value) {
    let Some(root) = document.as_object_mut() else {
        return;
    };
    let plugins = root.entry("plugins").or_insert_with(|| Value::Object(Map::new()));
    if let Some(plugins) = plugins.as_object_mut() {
        for settings in plugins.values_mut() {
            if let Some(settings) = settings.as_object_mut() {
                settings.entry("with").or_insert_with(|| Value::Object(Map::new()));
            }
        }
    }
}

/// Collect schema violations without modifying the document.
#[must_use]
pub fn collect_issues(document: &Value) -> Vec<ConfigurationIssue> {
    let mut issues = Vec::new();
    let Some(root) = document.as_object() else {
        issues.push(issue("", "expected a mapping at the document root"));
        return issues;
    };

    if let Some(imports) = root.get("imports") {
        check_string_array(imports, "/imports", &mut issues);
    }

    match root.get("plugins") {
        None => {}
        Some(Value::Object(plugins)) => {
            for (key, settings) in plugins {
                check_plugin_settings(settings, &format!("/plugins/{}", pointer_escape(key)), &mut issues);
            }
        }
        Some(_) => issues.push(issue("/plugins", "expected a mapping")),
    }

    issues
}

fn check_plugin_settings(settings: &Value, path: &str, issues: &mut Vec<ConfigurationIssue>) {
    let settings = match settings {
        Value::Null => return,
        Value::Object(settings) => settings,
        _ => {
            issues.push(issue(path, "expected null or a mapping"));
            return;
        }
    };

    if let Some(with) = settings.get("with") {
        if !with.is_object() {
            issues.push(issue(&format!("{path}/with"), "expected a mapping"));
        }
    }

    if let Some(runs_on) = settings.get("runsOn") {
        let runs_on_path = format!("{path}/runsOn");
        if check_string_array(runs_on, &runs_on_path, issues) {
            for (index, event) in runs_on.as_array().into_iter().flatten().enumerate() {
                if let Some(event) = event.as_str() {
                    if !is_webhook_event(event) {
                        issues.push(issue(
                            &format!("{runs_on_path}/{index}"),
                            &format!("unknown webhook event '{event}'"),
                        ));
                    }
                }
            }
        }
    }

    if let Some(skip) = settings.get("skipBotEvents") {
        if !skip.is_boolean() {
            issues.push(issue(&format!("{path}/skipBotEvents"), "expected a boolean"));
        }
    }
}

/// Reports non-array values and non-string items; returns `true` for an array.
fn check_string_array(value: &Value, path: &str, issues: &mut Vec<ConfigurationIssue>) -> bool {
    let Some(items) = value.as_array() else {
        issues.push(issue(path, "expected a sequence of strings"));
        return false;
    };
    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            issues.push(issue(&format!("{path}/{index}"), "expected a string"));
        }
    }
    true
}

fn issue(path: &str, message: &str) -> ConfigurationIssue {
    ConfigurationIssue::Schema {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn pointer_escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Apply defaults, validate and decode a parsed document.
///
/// Issues are logged at error level. Any issue left after defaulting, or a
/// decode failure, yields `value: None`; callers skip that source.
#[must_use]
pub fn validate_and_decode(document: &Value) -> Validated {
    let mut document = document.clone();
    apply_defaults(&mut document);

    let errors = collect_issues(&document);
    if !errors.is_empty() {
        for issue in &errors {
            error!(%issue, "Configuration validation error");
        }
        return Validated {
            value: None,
            errors,
        };
    }

    match serde_json::from_value::<PluginConfiguration>(document) {
        Ok(value) => Validated {
            value: Some(value),
            errors,
        },
        Err(e) => {
            error!(error = %e, "Error decoding configuration, it will be ignored");
            Validated {
                value: None,
                errors: vec![issue("", &e.to_string())],
            }
        }
    }
}
