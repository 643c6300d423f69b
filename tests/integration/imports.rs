use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use uos_plugin_sdk::constants::{CONFIG_PROD_FULL_PATH, MAX_IMPORT_DEPTH};
use uos_plugin_sdk::resolver::ConfigurationHandler;
use uos_plugin_sdk::test_utils::MockContentSource;

fn handler(source: &MockContentSource) -> ConfigurationHandler {
    ConfigurationHandler::new(Arc::new(source.clone()), "production").unwrap()
}

fn plugin_keys(result: &uos_plugin_sdk::configuration::ConfigurationResult) -> Vec<String> {
    result.config.as_ref().map(|c| c.plugins.keys().cloned().collect()).unwrap_or_default()
}

#[tokio::test]
async fn test_mutual_imports_terminate() {
    let source = MockContentSource::new()
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "imports: [acme/a]\nplugins:\n  acme/root:\n")
        .with_file("acme", "a", CONFIG_PROD_FULL_PATH, "imports: [acme/b]\nplugins:\n  acme/from-a:\n")
        .with_file(
            "acme",
            "b",
            CONFIG_PROD_FULL_PATH,
            "imports: [acme/a, acme/demo]\nplugins:\n  acme/from-b:\n",
        );

    let result = handler(&source).get_configuration_from_repo("acme", "demo").await;

    assert_eq!(plugin_keys(&result), vec!["acme/from-a", "acme/from-b", "acme/root"]);
    assert!(result.config.unwrap().imports.is_none());
    assert_eq!(source.calls_for("acme", "a", CONFIG_PROD_FULL_PATH), 1);
    assert_eq!(source.calls_for("acme", "b", CONFIG_PROD_FULL_PATH), 1);
    assert_eq!(source.calls_for("acme", "demo", CONFIG_PROD_FULL_PATH), 1);
}

#[tokio::test]
async fn test_import_chain_is_cut_below_max_depth() {
    let mut source = MockContentSource::new().with_file(
        "acme",
        "demo",
        CONFIG_PROD_FULL_PATH,
        "imports: [acme/level1]\nplugins: {}\n",
    );
    let last = MAX_IMPORT_DEPTH + 1;
    for level in 1..=last {
        let document = format!(
            "imports: [acme/level{}]\nplugins:\n  acme/p{level}:\n",
            level + 1
        );
        source = source.with_file("acme", &format!("level{level}"), CONFIG_PROD_FULL_PATH, &document);
    }

    let result = handler(&source).get_configuration_from_repo("acme", "demo").await;

    let expected: Vec<String> = (1..=MAX_IMPORT_DEPTH).map(|level| format!("acme/p{level}")).collect();
    let mut keys = plugin_keys(&result);
    keys.sort_by_key(|key| key.trim_start_matches("acme/p").parse::<usize>().unwrap_or(0));
    assert_eq!(keys, expected);
    assert_eq!(source.calls_for("acme", &format!("level{last}"), CONFIG_PROD_FULL_PATH), 0);
}

#[tokio::test]
async fn test_shared_import_is_downloaded_once() {
    let source = MockContentSource::new()
        .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "imports: [acme/a, acme/b]\n")
        .with_file("acme", "a", CONFIG_PROD_FULL_PATH, "imports: [acme/shared]\nplugins:\n  acme/a:\n")
        .with_file("acme", "b", CONFIG_PROD_FULL_PATH, "imports: [ACME/Shared]\nplugins:\n  acme/b:\n")
        .with_file("acme", "shared", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/shared:\n");

    let result = handler(&source).get_configuration_from_repo("acme", "demo").await;

    assert_eq!(plugin_keys(&result), vec!["acme/a", "acme/b", "acme/shared"]);
    assert_eq!(source.calls_for("acme", "shared", CONFIG_PROD_FULL_PATH), 1);
}

#[tokio::test]
async fn test_later_imports_and_local_entries_take_precedence() {
    let source = MockContentSource::new()
        .with_file(
            "acme",
            "demo",
            CONFIG_PROD_FULL_PATH,
            "imports: [acme/first, acme/second]\nplugins:\n  acme/local:\n    with:\n      v: local\n",
        )
        .with_file(
            "acme",
            "first",
            CONFIG_PROD_FULL_PATH,
            "plugins:\n  acme/shared:\n    with:\n      v: first\n  acme/local:\n    with:\n      v: first\n",
        )
        .with_file("acme", "second", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/shared:\n    with:\n      v: second\n");

    let config = handler(&source).get_configuration_from_repo("acme", "demo").await.config.unwrap();

    let with = |key: &str| config.plugins[key].as_ref().map(|s| json!(s.with)).unwrap_or_default();
    assert_eq!(with("acme/shared"), json!({"v": "second"}));
    assert_eq!(with("acme/local"), json!({"v": "local"}));
}

#[tokio::test]
async fn test_broken_imports_are_skipped() {
    let source = MockContentSource::new()
        .with_file(
            "acme",
            "demo",
            CONFIG_PROD_FULL_PATH,
            "imports: [acme/missing, acme/invalid, acme/failing, not-a-location, acme/good]\nplugins: {}\n",
        )
        .with_file("acme", "invalid", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/x:\n    with: nope\n")
        .with_failure("acme", "failing", CONFIG_PROD_FULL_PATH, 502)
        .with_file("acme", "good", CONFIG_PROD_FULL_PATH, "plugins:\n  acme/good:\n");

    let result = handler(&source).get_configuration_from_repo("acme", "demo").await;

    assert_eq!(plugin_keys(&result), vec!["acme/good"]);
    assert!(result.errors.is_none());
}
