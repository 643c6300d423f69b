use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn uos() -> Command {
    let mut cmd = Command::cargo_bin("uos").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("UOS_ENVIRONMENT").env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn test_parse_prints_identifier() {
    let output = uos().args(["parse", "acme/demo:deploy.yml@v1"]).assert().success();
    let value: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(
        value,
        json!({"kind": "github", "owner": "acme", "repo": "demo", "workflowId": "deploy.yml", "ref": "v1"})
    );
}

#[test]
fn test_parse_rejects_invalid_identifier() {
    uos()
        .args(["parse", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid plugin identifier: acme"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_resolve_rejects_invalid_repository() {
    uos().args(["resolve", "not-a-repo"]).assert().failure();
}

#[test]
fn test_broken_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(&config_path, "environment = [").unwrap();

    uos()
        .args(["--config", config_path.to_str().unwrap(), "resolve", "acme/demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fix the TOML syntax"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resolve_against_mock_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/demo/contents/.github/.ubiquity-os.config.dev.yml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("plugins:\n  acme/p:\n    runsOn: [push]\n"),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("[github]\napi_url = \"{}\"\n\n[http]\nmax_retries = 0\n", server.uri()),
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        uos()
            .args(["--config", config_path.to_str().unwrap()])
            .args(["resolve", "acme/demo", "--environment", "development", "--format", "yaml"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("acme/p:"), "unexpected output: {stdout}");
    assert!(stdout.contains("- push"), "unexpected output: {stdout}");
    assert!(stdout.contains("skipBotEvents: true"), "unexpected output: {stdout}");
}
