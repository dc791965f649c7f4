//! Command-line behaviour of the flowpulse binary

mod common;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    fixture_path, flowpulse, flowpulse_with_env, mount_token, strip_colors, MockEnvironment,
    EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS, TOKEN_PATH,
};

const TWO_STEPS: &str = "\
@startuml
Client -> Bank: GET /accounts
Client -> Bank: GET /accounts/{accountId}/balances
@enduml
";

// ============================================================================
// Help and argument errors
// ============================================================================

#[test]
fn test_help() {
    AssertCommand::cargo_bin("flowpulse")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run").and(predicate::str::contains("DIAGRAM")));
}

#[test]
fn test_version() {
    AssertCommand::cargo_bin("flowpulse")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_diagram_argument() {
    AssertCommand::cargo_bin("flowpulse")
        .unwrap()
        .assert()
        .code(EXIT_ERROR)
        .stderr(predicate::str::contains("DIAGRAM"));
}

#[test]
fn test_unreadable_diagram() {
    let r = flowpulse(&["/nonexistent/flow.bpmn", "--validate"]);
    assert_eq!(r.exit_code, EXIT_ERROR);
    assert!(r.stderr.contains("Cannot read diagram"), "{}", r.stderr);
}

#[test]
fn test_malformed_diagram() {
    let env = MockEnvironment::new();
    let diagram = env.write_diagram("broken.bpmn", "<definitions><process id=\"p\">");
    let r = flowpulse_with_env(&[diagram.to_str().unwrap(), "--validate"], &env);
    assert_eq!(r.exit_code, EXIT_ERROR);
    assert!(r.stderr.contains("Parse error"), "{}", r.stderr);
}

#[test]
fn test_missing_explicit_config() {
    let r = flowpulse(&[
        fixture_path("payments.puml").to_str().unwrap(),
        "--config",
        "/nonexistent/flowpulse.toml",
        "--validate",
    ]);
    assert_eq!(r.exit_code, EXIT_ERROR);
    assert!(r.stderr.contains("Config file not found"), "{}", r.stderr);
}

#[test]
fn test_run_without_base_url() {
    let r = flowpulse(&[fixture_path("payments.puml").to_str().unwrap()]);
    assert_eq!(r.exit_code, EXIT_ERROR);
    assert!(r.stderr.contains("No base URL configured"), "{}", r.stderr);
}

// ============================================================================
// Validate and dry run
// ============================================================================

#[test]
fn test_validate_prints_plan() {
    let r = flowpulse(&[fixture_path("payments.bpmn").to_str().unwrap(), "--validate"]);
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}", r.stderr);

    let out = strip_colors(&r.stdout);
    assert!(out.contains("EXECUTION PLAN"));
    assert!(out.contains("Process: Payment flow"));
    assert!(out.contains("[1] Authentication (auth)"));
    assert!(out.contains("credential request"));
    assert!(out.contains("[4] Create payment (pay)"));
    assert!(!out.contains("No requests were sent"));
}

#[test]
fn test_name_defaults_to_file_stem() {
    let env = MockEnvironment::new();
    let diagram = env.write_diagram("onboarding.puml", TWO_STEPS);
    let r = flowpulse_with_env(&[diagram.to_str().unwrap(), "--validate"], &env);
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}", r.stderr);
    assert!(strip_colors(&r.stdout).contains("Process: onboarding"));
}

#[test]
fn test_explicit_name() {
    let r = flowpulse(&[
        fixture_path("payments.bpmn").to_str().unwrap(),
        "--name",
        "Nightly payments",
        "--validate",
    ]);
    assert!(strip_colors(&r.stdout).contains("Process: Nightly payments"));
}

#[test]
fn test_dry_run_resolves_urls() {
    let env = MockEnvironment::new();
    let config = env.write_config(
        r#"
[[mappings]]
from = "/accounts/{accountId}/balances"
to = "/v2/accounts/{accountId}/balance"
"#,
    );
    let diagram = env.write_diagram("flow.puml", TWO_STEPS);

    let r = flowpulse_with_env(
        &[
            diagram.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--base-url",
            "http://api.test",
            "--dry-run",
        ],
        &env,
    );
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}", r.stderr);

    let out = strip_colors(&r.stdout);
    assert!(out.contains("-> http://api.test/accounts"));
    assert!(out.contains("-> http://api.test/v2/accounts/{accountId}/balance"));
    assert!(out.contains("No requests were sent"));
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_successful_run_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accountId": "A1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accounts/A1/balances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 1})))
        .mount(&server)
        .await;

    let env = MockEnvironment::new();
    let diagram = env.write_diagram("flow.puml", TWO_STEPS);
    let r = flowpulse_with_env(
        &[diagram.to_str().unwrap(), "--base-url", &server.uri(), "--json"],
        &env,
    );
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}", r.stderr);

    let lines = r.json_lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], "step_result");
    assert_eq!(lines[1]["url"], format!("{}/accounts/A1/balances", server.uri()));
    assert_eq!(lines[2]["event"], "execution_summary");
    assert_eq!(lines[2]["status"], "COMPLETED");
    assert_eq!(lines[2]["mode"], "STANDARD");
}

#[tokio::test]
async fn test_failed_run_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let env = MockEnvironment::new();
    let diagram = env.write_diagram("flow.puml", TWO_STEPS);
    let r = flowpulse_with_env(&[diagram.to_str().unwrap(), "--base-url", &server.uri()], &env);
    assert_eq!(r.exit_code, EXIT_FAILED, "{}", r.stderr);

    let out = strip_colors(&r.stdout);
    assert!(out.contains("EXECUTION RESULTS"));
    assert!(out.contains("Error: HTTP 503 Service Unavailable"));
    assert!(out.contains("Total: 1 | Passed: 0 | Failed: 1 | Status: FAILED"));
}

#[tokio::test]
async fn test_var_seeds_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/55/balances"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let env = MockEnvironment::new();
    let diagram = env.write_diagram("one.puml", "C -> B: GET /accounts/{accountId}/balances\n");
    let r = flowpulse_with_env(
        &[diagram.to_str().unwrap(), "--base-url", &server.uri(), "--var", "accountId=55"],
        &env,
    );
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}{}", r.stdout, r.stderr);
}

#[tokio::test]
async fn test_env_credentials_drive_auth_step() {
    let server = MockServer::start().await;
    mount_token(&server, "env-token", 1).await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("Authorization", "Bearer env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut env = MockEnvironment::new();
    env.set_env("FLOWPULSE_BASE_URL", &server.uri())
        .set_env("FLOWPULSE_AUTH_URL", &format!("{}{}", server.uri(), TOKEN_PATH))
        .set_env("OAUTH_CLIENT_ID", "team-42")
        .set_env("OAUTH_CLIENT_SECRET", "s3cret");
    let diagram = env.write_diagram(
        "auth.puml",
        "C -> B: POST /auth/bank-token\nC -> B: GET /accounts\n",
    );

    let r = flowpulse_with_env(&[diagram.to_str().unwrap()], &env);
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}{}", r.stdout, r.stderr);
    assert!(!r.stdout.contains("s3cret"));
    assert!(!r.stderr.contains("s3cret"));
}

#[tokio::test]
async fn test_dotenv_supplies_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let env = MockEnvironment::new();
    env.write_diagram(".env", &format!("FLOWPULSE_BASE_URL={}\n", server.uri()));
    let diagram = env.write_diagram("health.puml", "C -> B: GET /health\n");

    let r = flowpulse_with_env(&[diagram.to_str().unwrap()], &env);
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}{}", r.stdout, r.stderr);
}

#[tokio::test]
async fn test_config_overrides_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/payments"))
        .and(wiremock::matchers::body_json(json!({"amount": 1, "currency": "EUR"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let env = MockEnvironment::new();
    let config = env.write_config(&format!(
        r#"
[api]
base_url = "{}"

[[mappings]]
from = "/payments"
to = "/v2/payments"

[[overrides]]
endpoint = "/payments"
payload = {{ amount = 1, currency = "EUR" }}
"#,
        server.uri()
    ));
    let diagram = env.write_diagram("pay.puml", "C -> B: POST /payments (amount)\n");

    let r = flowpulse_with_env(
        &[diagram.to_str().unwrap(), "--config", config.to_str().unwrap(), "--var", "note=x"],
        &env,
    );
    assert_eq!(r.exit_code, EXIT_SUCCESS, "{}{}", r.stdout, r.stderr);
}
