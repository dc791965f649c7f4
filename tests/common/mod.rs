//! Common test utilities for flowpulse integration tests
//!
//! - Binary invocation with an isolated home/config directory
//! - Engine construction against a wiremock server
//! - Fixture paths

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flowpulse::auth::{CredentialConfig, CredentialProvider};
use flowpulse::http::{build_client, TlsOptions};
use flowpulse::pipeline::ExecutionEngine;
use flowpulse::process::{parse_process, Dialect, ProcessDefinition};

/// Exit codes of the binary
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_FAILED: i32 = 10;

/// Token endpoint path used by the auth mocks
pub const TOKEN_PATH: &str = "/realms/test/token";

/// Variables that would leak the developer's setup into a test run
const SCRUBBED_ENV: &[&str] = &[
    "FLOWPULSE_BASE_URL",
    "FLOWPULSE_GOST_BASE_URL",
    "FLOWPULSE_AUTH_URL",
    "FLOWPULSE_CLIENT_ID",
    "FLOWPULSE_CLIENT_SECRET",
    "OAUTH_CLIENT_ID",
    "OAUTH_CLIENT_SECRET",
    "RUST_LOG",
];

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliResponse {
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Parsed JSON lines from stdout
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("stdout line is not JSON"))
            .collect()
    }
}

/// Isolated environment: a temp home/config dir plus extra variables
pub struct MockEnvironment {
    home: TempDir,
    env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp home"),
            env_vars: HashMap::new(),
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn home(&self) -> PathBuf {
        self.home.path().to_path_buf()
    }

    /// Write a config file inside the temp home and return its path
    pub fn write_config(&self, toml: &str) -> PathBuf {
        let path = self.home.path().join("flowpulse.toml");
        std::fs::write(&path, toml).expect("Failed to write config");
        path
    }

    /// Write a diagram inside the temp home and return its path
    pub fn write_diagram(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, content).expect("Failed to write diagram");
        path
    }

    /// A binary command wired to this environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_flowpulse"));
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        cmd.env("HOME", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.current_dir(self.home.path());
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Run the CLI in a fresh environment
pub fn flowpulse(args: &[&str]) -> CliResponse {
    flowpulse_with_env(args, &MockEnvironment::new())
}

pub fn flowpulse_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = env.command();
    cmd.args(["--timeout", "2"]);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    parse_output(cmd.output().expect("Failed to execute flowpulse"))
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    }
}

/// Strip ANSI color codes from a string
pub fn strip_colors(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    re.replace_all(s, "").to_string()
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

/// Parse diagram text, panicking on error
pub fn process(text: &str) -> ProcessDefinition {
    parse_process(text, Some("Test process"), Dialect::Auto).expect("diagram should parse")
}

/// Engine pointed at a mock server
pub fn engine_for(server: &MockServer) -> ExecutionEngine {
    let client = build_client(Duration::from_secs(5), &TlsOptions::default()).expect("client");
    ExecutionEngine::new(client, server.uri()).with_timeout(Duration::from_secs(5))
}

/// Credential provider for the mock token endpoint
pub fn credentials_for(server: &MockServer) -> Arc<CredentialProvider> {
    let config = CredentialConfig::new(format!("{}{}", server.uri(), TOKEN_PATH))
        .with_client("team-42", "s3cret");
    let client = build_client(Duration::from_secs(5), &TlsOptions::default()).expect("client");
    Arc::new(CredentialProvider::new(config, client))
}

/// Mount a token endpoint answering with `token`
pub async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 300
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}
