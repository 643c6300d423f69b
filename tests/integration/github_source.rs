use serde_json::json;
use uos_plugin_sdk::config::GlobalConfig;
use uos_plugin_sdk::identifier::Location;
use uos_plugin_sdk::resolver::ConfigurationHandler;
use uos_plugin_sdk::test_utils::ManifestFixture;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, environment: &str) -> GlobalConfig {
    let mut config = GlobalConfig::default();
    config.environment = environment.to_string();
    config.github.api_url = server.uri();
    config.github.token = Some("test-token".to_string());
    config.http.max_retries = 1;
    config
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolution_over_contents_api() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/repos/acme/.ubiquity-os/contents/.github/.ubiquity-os.config.yml",
        "plugins:\n  acme/start-stop@v1:\n    with:\n      limit: 2\n",
    )
    .await;
    serve(
        &server,
        "/repos/acme/demo/contents/.github/.ubiquity-os.config.yml",
        "imports: [acme/shared]\n",
    )
    .await;
    serve(
        &server,
        "/repos/acme/shared/contents/.github/.ubiquity-os.config.yml",
        "plugins:\n  acme/rewards:\n    skipBotEvents: false\n",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/start-stop/contents/manifest.json"))
        .and(query_param("ref", "v1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(
                ManifestFixture::new("acme/start-stop@v1").with_listeners(&["issue_comment.created"]).to_json(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handler = ConfigurationHandler::from_config(&config_for(&server, "production")).unwrap();
    let resolved = handler.get_configuration(Some(&Location::new("acme", "demo"))).await;

    let start_stop = &resolved.plugins["acme/start-stop@v1"];
    assert_eq!(start_stop.with["limit"], json!(2));
    assert_eq!(start_stop.runs_on, vec!["issue_comment.created"]);

    let rewards = &resolved.plugins["acme/rewards"];
    assert!(rewards.runs_on.is_empty());
    assert!(!rewards.skip_bot_events);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/demo/contents/.github/.ubiquity-os.config.dev.yml"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let handler = ConfigurationHandler::from_config(&config_for(&server, "development")).unwrap();
    let result = handler.get_configuration_from_repo("acme", "demo").await;

    assert!(result.config.is_none());
    assert!(result.raw_data.is_none());
}
