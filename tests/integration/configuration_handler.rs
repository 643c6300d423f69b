use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use uos_plugin_sdk::constants::{
    CONFIG_DEV_FULL_PATH, CONFIG_ORG_REPO, CONFIG_PROD_FULL_PATH, MANIFEST_FILE,
};
use uos_plugin_sdk::identifier::Location;
use uos_plugin_sdk::resolver::ConfigurationHandler;
use uos_plugin_sdk::test_utils::{
    ManifestFixture, MockContentSource, StaticSourceResolver, init_test_logging,
};

fn handler(source: &MockContentSource, environment: &str) -> ConfigurationHandler {
    ConfigurationHandler::new(Arc::new(source.clone()), environment).unwrap()
}

/// Repository entries replace organization entries as a whole.
#[tokio::test]
async fn test_repository_entry_replaces_organization_entry() {
    init_test_logging(None);
    let source = MockContentSource::new()
        .with_file(
            "acme",
            CONFIG_ORG_REPO,
            CONFIG_PROD_FULL_PATH,
            "plugins:\n  acme/p:\n    with:\n      x: 1\n      y: 2\n  acme/org-only:\n",
        )
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/p:\n    with:\n      x: 3\n");

    let resolved =
        handler(&source, "production").get_configuration(Some(&Location::new("acme", "demo"))).await;

    assert_eq!(resolved.plugins.keys().collect::<Vec<_>>(), vec!["acme/org-only", "acme/p"]);
    assert_eq!(serde_json::Value::Object(resolved.plugins["acme/p"].with.clone()), json!({"x": 3}));
    assert_eq!(resolved.plugins["acme/org-only"].with.len(), 0);
}

#[tokio::test]
async fn test_missing_repository_document_keeps_organization_plugins() {
    let source = MockContentSource::new().with_file(
        "acme",
        CONFIG_ORG_REPO,
        CONFIG_PROD_FULL_PATH,
        "plugins:\n  acme/p:\n    runsOn: [push]\n",
    );

    let resolved =
        handler(&source, "production").get_configuration(Some(&Location::new("acme", "demo"))).await;

    assert_eq!(resolved.plugins["acme/p"].runs_on, vec!["push"]);
    assert_eq!(source.calls_for("acme", "demo", CONFIG_PROD_FULL_PATH), 1);
}

#[tokio::test]
async fn test_invalid_repository_document_is_ignored() {
    let source = MockContentSource::new()
        .with_file("acme", CONFIG_ORG_REPO, CONFIG_PROD_FULL_PATH, "plugins:\n  acme/p:\n")
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins: [not, a, mapping]\n");
    let handler = handler(&source, "production");

    let repo = handler.get_configuration_from_repo("acme", "demo").await;
    assert!(repo.config.is_none());
    assert!(repo.errors.is_some());

    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;
    assert_eq!(resolved.plugins.keys().collect::<Vec<_>>(), vec!["acme/p"]);
}

#[tokio::test]
async fn test_server_errors_degrade_to_no_document() {
    let source = MockContentSource::new()
        .with_failure("acme", CONFIG_ORG_REPO, CONFIG_PROD_FULL_PATH, 500)
        .with_timeout("acme", "demo", CONFIG_PROD_FULL_PATH);

    let resolved =
        handler(&source, "production").get_configuration(Some(&Location::new("acme", "demo"))).await;
    assert!(resolved.plugins.is_empty());
}

#[tokio::test]
async fn test_environment_selects_document() {
    let source = MockContentSource::new()
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/prod:\n")
        .with_file("acme", "demo", CONFIG_DEV_FULL_PATH, "plugins:\n  acme/dev:\n");
    let location = Location::new("acme", "demo");

    let prod = handler(&source, "production").get_configuration(Some(&location)).await;
    assert_eq!(prod.plugins.keys().collect::<Vec<_>>(), vec!["acme/prod"]);

    let dev = handler(&source, "development").get_configuration(Some(&location)).await;
    assert_eq!(dev.plugins.keys().collect::<Vec<_>>(), vec!["acme/dev"]);

    // No `.config.staging.yml`, so the development document is used
    let staging = handler(&source, "staging").get_configuration(Some(&location)).await;
    assert_eq!(staging.plugins.keys().collect::<Vec<_>>(), vec!["acme/dev"]);
}

#[tokio::test]
async fn test_manifest_defaults_fill_unset_settings() {
    let source = MockContentSource::new()
        .with_file(
            "acme",
            "demo",
            CONFIG_PROD_FULL_PATH,
            "plugins:\n  acme/a:\n  acme/b:\n    runsOn: [push]\n    skipBotEvents: true\n",
        )
        .with_file(
            "acme",
            "a",
            MANIFEST_FILE,
            &ManifestFixture::new("acme/a")
                .with_listeners(&["issues.opened", "issue_comment.created"])
                .with_skip_bot_events(false)
                .to_json(),
        )
        .with_file(
            "acme",
            "b",
            MANIFEST_FILE,
            &ManifestFixture::new("acme/b")
                .with_listeners(&["issues.closed"])
                .with_skip_bot_events(false)
                .to_json(),
        );

    let resolved =
        handler(&source, "production").get_configuration(Some(&Location::new("acme", "demo"))).await;

    let a = &resolved.plugins["acme/a"];
    assert_eq!(a.runs_on, vec!["issues.opened", "issue_comment.created"]);
    assert!(!a.skip_bot_events);

    let b = &resolved.plugins["acme/b"];
    assert_eq!(b.runs_on, vec!["push"]);
    assert!(b.skip_bot_events);
}

#[tokio::test]
async fn test_manifests_are_fetched_once_per_handler() {
    let source = MockContentSource::new()
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/p:\n")
        .with_file("acme", "other", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/p:\n")
        .with_file("acme", "p", MANIFEST_FILE, &ManifestFixture::new("acme/p").to_json());
    let handler = handler(&source, "production");

    let (demo, other) = (Location::new("acme", "demo"), Location::new("acme", "other"));
    let (first, second) = tokio::join!(
        handler.get_configuration(Some(&demo)),
        handler.get_configuration(Some(&other))
    );
    assert_eq!(first.plugins["acme/p"], second.plugins["acme/p"]);
    assert_eq!(source.calls_for("acme", "p", MANIFEST_FILE), 1);
}

#[tokio::test]
async fn test_source_resolver_serves_other_installations() {
    let partner = MockContentSource::new().with_file(
        "partner",
        "shared",
        CONFIG_PROD_FULL_PATH,
        "plugins:\n  partner/tool:\n    with:\n      from: partner\n",
    );
    let default = MockContentSource::new().with_file(
        "acme",
        "demo",
        CONFIG_PROD_FULL_PATH,
        "imports: [partner/shared]\nplugins:\n  acme/p:\n",
    );
    let resolver = StaticSourceResolver::new().with_source("partner", "shared", Arc::new(partner.clone()));
    let handler = ConfigurationHandler::new(Arc::new(default.clone()), "production")
        .unwrap()
        .with_source_resolver(Arc::new(resolver));

    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;

    assert_eq!(resolved.plugins["partner/tool"].with["from"], json!("partner"));
    assert!(resolved.plugins.contains_key("acme/p"));
    assert_eq!(partner.calls_for("partner", "shared", CONFIG_PROD_FULL_PATH), 1);
    assert_eq!(default.calls_for("partner", "shared", CONFIG_PROD_FULL_PATH), 0);
}

#[tokio::test]
async fn test_passthrough_keys_survive_resolution() {
    let source = MockContentSource::new()
        .with_file("acme", CONFIG_ORG_REPO, CONFIG_PROD_FULL_PATH, "incentives:\n  enabled: true\n")
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins: {}\nlabels: [bug]\n");

    let resolved =
        handler(&source, "production").get_configuration(Some(&Location::new("acme", "demo"))).await;
    assert_eq!(resolved.extra["incentives"], json!({"enabled": true}));
    assert_eq!(resolved.extra["labels"], json!(["bug"]));
}
