//! Config file handling

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::auth::{AuthFlavor, CredentialConfig, DEFAULT_ENDPOINT_PATTERNS, DEFAULT_EXPIRES_IN, DEFAULT_NAME_PATTERNS};
use crate::errors::FlowpulseError;
use crate::http::TlsOptions;
use crate::mapping::EndpointMapping;
use crate::pipeline::{ExecutionMode, PayloadOverride, DEFAULT_EXTRACT_FIELDS, DEFAULT_TIMEOUT};

use super::dotenv::EnvVars;

pub const ENV_BASE_URL: &str = "FLOWPULSE_BASE_URL";
pub const ENV_GOST_BASE_URL: &str = "FLOWPULSE_GOST_BASE_URL";
pub const ENV_AUTH_URL: &str = "FLOWPULSE_AUTH_URL";
pub const ENV_CLIENT_ID: &[&str] = &["FLOWPULSE_CLIENT_ID", "OAUTH_CLIENT_ID"];
pub const ENV_CLIENT_SECRET: &[&str] = &["FLOWPULSE_CLIENT_SECRET", "OAUTH_CLIENT_SECRET"];

/// `[api]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub gost_base_url: Option<String>,
    /// Humantime string, e.g. `30s` or `2m`
    pub timeout: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

/// `[auth]`
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub flavor: AuthFlavor,
    pub default_expires_in: u64,
    pub endpoint_patterns: Vec<String>,
    pub name_patterns: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: None,
            client_id: None,
            client_secret: None,
            flavor: AuthFlavor::Form,
            default_expires_in: DEFAULT_EXPIRES_IN,
            endpoint_patterns: DEFAULT_ENDPOINT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            name_patterns: DEFAULT_NAME_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("flavor", &self.flavor)
            .field("default_expires_in", &self.default_expires_in)
            .field("endpoint_patterns", &self.endpoint_patterns)
            .field("name_patterns", &self.name_patterns)
            .finish()
    }
}

/// `[extract]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub fields: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            fields: DEFAULT_EXTRACT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// flowpulse configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub mappings: Vec<EndpointMapping>,
    pub overrides: Vec<PayloadOverride>,
    pub extract: ExtractConfig,
}

impl Config {
    /// Load from `explicit`, or from the default location when it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, FlowpulseError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(FlowpulseError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| FlowpulseError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), mappings = config.mappings.len(), "Loaded config");
        Ok(config)
    }

    /// Parse TOML text; the timeout string is checked here
    pub fn from_toml(content: &str) -> Result<Self, FlowpulseError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| FlowpulseError::Config(format!("Invalid config TOML: {}", e)))?;
        config.timeout()?;
        Ok(config)
    }

    /// `<config_dir>/flowpulse/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("flowpulse").join("config.toml"))
    }

    /// Environment variables override file values
    pub fn apply_env(&mut self, env: &EnvVars) {
        if let Some(v) = env.first_of(&[ENV_BASE_URL]) {
            self.api.base_url = Some(v);
        }
        if let Some(v) = env.first_of(&[ENV_GOST_BASE_URL]) {
            self.api.gost_base_url = Some(v);
        }
        if let Some(v) = env.first_of(&[ENV_AUTH_URL]) {
            self.auth.token_url = Some(v);
        }
        if let Some(v) = env.first_of(ENV_CLIENT_ID) {
            self.auth.client_id = Some(v);
        }
        if let Some(v) = env.first_of(ENV_CLIENT_SECRET) {
            self.auth.client_secret = Some(v);
        }
    }

    pub fn timeout(&self) -> Result<Duration, FlowpulseError> {
        match self.api.timeout.as_deref() {
            None => Ok(DEFAULT_TIMEOUT),
            Some(text) => humantime::parse_duration(text.trim())
                .map_err(|e| FlowpulseError::Config(format!("Invalid timeout '{}': {}", text, e))),
        }
    }

    /// Base URL for `mode`; GOST falls back to the standard one
    pub fn base_url_for(&self, mode: ExecutionMode) -> Option<&str> {
        let standard = self.api.base_url.as_deref().filter(|s| !s.is_empty());
        match mode {
            ExecutionMode::Standard => standard,
            ExecutionMode::Gost => self
                .api
                .gost_base_url
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(standard),
        }
    }

    pub fn tls_options(&self) -> TlsOptions {
        TlsOptions {
            ca_cert: self.api.ca_cert.clone(),
            client_cert: self.api.client_cert.clone(),
            client_key: self.api.client_key.clone(),
        }
    }

    /// Token endpoint settings, when a token URL is configured
    pub fn credential_config(&self) -> Option<CredentialConfig> {
        let token_url = self.auth.token_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let mut config = CredentialConfig::new(token_url);
        config.client_id = self.auth.client_id.clone();
        config.client_secret = self.auth.client_secret.clone();
        config.flavor = self.auth.flavor;
        config.default_expires_in = self.auth.default_expires_in;
        Some(config)
    }
}
