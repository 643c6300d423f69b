use serde_json::json;
use std::sync::Arc;
use uos_plugin_sdk::constants::CONFIG_PROD_FULL_PATH;
use uos_plugin_sdk::identifier::{Location, PluginIdentifier};
use uos_plugin_sdk::resolver::ConfigurationHandler;
use uos_plugin_sdk::test_utils::{ManifestFixture, MockContentSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_manifest(server: &MockServer, fixture: &ManifestFixture, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture.value()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn handler_with_config(document: &str) -> ConfigurationHandler {
    let source = MockContentSource::new().with_file("acme", "demo", CONFIG_PROD_FULL_PATH, document);
    ConfigurationHandler::new(Arc::new(source), "production").unwrap()
}

#[tokio::test]
async fn test_url_plugin_is_enriched_from_hosted_manifest() {
    let server = MockServer::start().await;
    let fixture = ManifestFixture::new("acme/hosted")
        .with_listeners(&["pull_request.opened"])
        .with_skip_bot_events(false)
        .with_homepage(&server.uri());
    serve_manifest(&server, &fixture, 1).await;

    let handler = handler_with_config(&format!("plugins:\n  {}:\n    with:\n      a: 1\n", server.uri()));
    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;

    let settings = &resolved.plugins[&server.uri()];
    assert_eq!(settings.runs_on, vec!["pull_request.opened"]);
    assert!(!settings.skip_bot_events);
    assert_eq!(settings.with["a"], json!(1));
}

/// `https://host` and `https://host/` share one manifest request.
#[tokio::test]
async fn test_trailing_slash_shares_cache_entry() {
    let server = MockServer::start().await;
    serve_manifest(&server, &ManifestFixture::new("acme/hosted").with_listeners(&["push"]), 1).await;

    let handler = handler_with_config(&format!(
        "plugins:\n  {uri}:\n  {uri}/:\n",
        uri = server.uri()
    ));
    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;

    assert_eq!(resolved.plugins.len(), 2);
    assert!(resolved.plugins.values().all(|settings| settings.runs_on == vec!["push"]));
}

#[tokio::test]
async fn test_unavailable_manifest_uses_defaults_and_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let handler = handler_with_config(&format!("plugins:\n  {}:\n", server.uri()));
    let plugin = PluginIdentifier::parse(&server.uri()).unwrap();

    assert!(handler.get_manifest(&plugin).await.unwrap().is_none());
    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;

    let settings = &resolved.plugins[&server.uri()];
    assert!(settings.runs_on.is_empty());
    assert!(settings.skip_bot_events);
    assert!(!handler.manifests().is_cached(&plugin));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ManifestFixture::new("acme/hosted").value())
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler_with_config("plugins: {}\n");
    let plugin = PluginIdentifier::parse(&server.uri()).unwrap();

    let (a, b) = tokio::join!(handler.get_manifest(&plugin), handler.get_manifest(&plugin));
    let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert!(handler.manifests().is_cached(&plugin));
}

#[tokio::test]
async fn test_self_configuration_by_homepage() {
    let server = MockServer::start().await;
    let handler = handler_with_config(&format!(
        "plugins:\n  {}/:\n    with:\n      source: hosted\n  acme/hosted:\n    with:\n      source: repo\n",
        server.uri()
    ));
    let manifest = ManifestFixture::new("acme/hosted").with_homepage(&server.uri()).build();

    let found = handler
        .get_self_configuration(&manifest, Some(&Location::new("acme", "demo")))
        .await
        .unwrap();
    assert_eq!(found["source"], json!("hosted"));
}
