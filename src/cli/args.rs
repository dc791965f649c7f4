//! CLI argument definitions using clap

use clap::{ArgAction, Parser, ValueEnum};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::pipeline::ExecutionMode;
use crate::process::Dialect;

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "")
        } else {
            write!(f, "[REDACTED]")
        }
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString(s)
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// flowpulse - run API test scenarios described by BPMN or sequence diagrams
#[derive(Parser, Debug, Clone)]
#[command(name = "flowpulse", version, about, long_about = None)]
pub struct Args {
    /// Diagram file (.bpmn / .xml or a PlantUML-style sequence diagram)
    #[arg(value_name = "DIAGRAM")]
    pub diagram: PathBuf,

    /// Process name (default: BPMN process name, else the file stem)
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Diagram dialect
    #[arg(long = "dialect", value_enum, default_value_t = Dialect::Auto)]
    pub dialect: Dialect,

    // =========================================================================
    // RUN CONTROL
    // =========================================================================

    /// Parse only and print the ordered step plan
    #[arg(long = "validate", action = ArgAction::SetTrue, conflicts_with = "dry_run")]
    pub validate: bool,

    /// Print the plan with resolved URLs without sending any request
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Target environment
    #[arg(long = "mode", value_enum, default_value_t = ExecutionMode::Standard)]
    pub mode: ExecutionMode,

    /// API base URL (overrides config and FLOWPULSE_BASE_URL)
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Config file (default: <config dir>/flowpulse/config.toml)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed the execution context: key=value, value parsed as JSON when possible
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var, action = ArgAction::Append)]
    pub vars: Vec<(String, Value)>,

    /// Generate request bodies from endpoint schemas
    #[arg(long = "generate-data", action = ArgAction::SetTrue)]
    pub generate_data: bool,

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// Token endpoint for client-credentials auth steps
    #[arg(long = "auth-url", value_name = "URL")]
    pub auth_url: Option<String>,

    /// OAuth2 client id
    #[arg(long = "client-id", value_name = "ID")]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long = "client-secret", value_name = "SECRET")]
    pub client_secret: Option<SecretString>,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Print JSON lines (step results, then the execution summary)
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// Verbose output. Use -vv for even more verbose
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format for diagnostic logs on stderr
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log format for structured output (CI/CD)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

/// `key=value` with the value read as JSON when it parses, else as a string
pub fn parse_var(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("accountId=123").unwrap(), ("accountId".into(), json!(123)));
        assert_eq!(parse_var("name=alice").unwrap(), ("name".into(), json!("alice")));
        assert_eq!(parse_var("flags={\"a\":true}").unwrap().1, json!({"a": true}));
        assert_eq!(parse_var("q=a=b").unwrap().1, json!("a=b"));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=1").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "flowpulse",
            "flow.bpmn",
            "--mode",
            "gost",
            "--var",
            "accountId=7",
            "--var",
            "x=y",
            "--client-secret",
            "hush",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.mode, ExecutionMode::Gost);
        assert_eq!(args.vars.len(), 2);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.dialect, Dialect::Auto);
        assert!(!format!("{:?}", args).contains("hush"));
    }

    #[test]
    fn test_validate_conflicts_with_dry_run() {
        assert!(Args::try_parse_from(["flowpulse", "a.puml", "--validate", "--dry-run"]).is_err());
    }

    #[test]
    fn test_secret_string_redaction() {
        let secret = SecretString("hunter2".to_string());
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.as_str(), "hunter2");
    }
}
